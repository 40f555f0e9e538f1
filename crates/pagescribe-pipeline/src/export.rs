// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Export serializers for transcription output.
//
// The CSV exporter recovers page boundaries by matching the exact header
// lines written by `assemble`. Text with any other header format yields no
// rows.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use pagescribe_core::error::{Result, ScribeError};
use pagescribe_core::FileResult;
use regex::Regex;
use serde::{Deserialize, Serialize};

static PAGE_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^=== Page (\d+)( \(OCR\))? ===$").expect("page header pattern is valid")
});

/// Output format of an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Text,
    Markdown,
    Csv,
    Json,
}

impl ExportFormat {
    /// File extension, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Text => "txt",
            Self::Markdown => "md",
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }

    /// Render a single assembled document.
    pub fn render_document(&self, name: &str, text: &str) -> Result<String> {
        self.render_result(&FileResult {
            name: name.to_string(),
            content: text.to_string(),
            success: true,
        })
    }

    /// Render one registry entry on its own, keeping its success flag.
    pub fn render_result(&self, result: &FileResult) -> Result<String> {
        let (name, text) = (result.name.as_str(), result.content.as_str());
        match self {
            Self::Text => Ok(text.to_string()),
            Self::Markdown => Ok(markdown_section(name, text)),
            Self::Csv => Ok(csv_rows(std::iter::once((name, text)))),
            Self::Json => Ok(serde_json::to_string_pretty(result)?),
        }
    }

    /// Render a batch registry, in registry order.
    pub fn render_batch(&self, results: &[FileResult]) -> Result<String> {
        match self {
            Self::Text => Ok(results
                .iter()
                .map(|r| format!("##### {} #####\n{}\n", r.name, r.content))
                .collect::<Vec<_>>()
                .join("\n")),
            Self::Markdown => Ok(results
                .iter()
                .map(|r| markdown_section(&r.name, &r.content))
                .collect::<Vec<_>>()
                .join("\n\n")),
            Self::Csv => Ok(csv_rows(
                results.iter().map(|r| (r.name.as_str(), r.content.as_str())),
            )),
            Self::Json => Ok(serde_json::to_string_pretty(results)?),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ScribeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "txt" | "text" => Ok(Self::Text),
            "md" | "markdown" => Ok(Self::Markdown),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(ScribeError::UnknownFormat(other.to_string())),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

// -- Page recovery ------------------------------------------------------------

/// A page block recovered from assembled text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedPage {
    pub page_number: u32,
    pub recognized: bool,
    pub text: String,
}

/// Split assembled text back into pages by matching header lines.
/// Anything before the first header is ignored.
pub fn split_pages(text: &str) -> Vec<ExportedPage> {
    let mut pages = Vec::new();
    let mut current: Option<(ExportedPage, Vec<&str>)> = None;

    for line in text.lines() {
        if let Some(caps) = PAGE_HEADER.captures(line) {
            let Ok(page_number) = caps[1].parse::<u32>() else {
                continue;
            };
            if let Some((mut page, body)) = current.take() {
                page.text = body.join("\n").trim().to_string();
                pages.push(page);
            }
            current = Some((
                ExportedPage {
                    page_number,
                    recognized: caps.get(2).is_some(),
                    text: String::new(),
                },
                Vec::new(),
            ));
        } else if let Some((_, body)) = current.as_mut() {
            body.push(line);
        }
    }

    if let Some((mut page, body)) = current {
        page.text = body.join("\n").trim().to_string();
        pages.push(page);
    }
    pages
}

fn markdown_section(name: &str, text: &str) -> String {
    let body = text
        .lines()
        .map(|line| match PAGE_HEADER.captures(line) {
            Some(caps) if caps.get(2).is_some() => format!("## Page {} (OCR)", &caps[1]),
            Some(caps) => format!("## Page {}", &caps[1]),
            None => line.to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n");
    format!("# {name}\n\n{body}")
}

fn csv_rows<'a>(documents: impl Iterator<Item = (&'a str, &'a str)>) -> String {
    let mut out = String::from("file,page,ocr,text\n");
    for (name, text) in documents {
        for page in split_pages(text) {
            out.push_str(&format!(
                "{},{},{},{}\n",
                csv_field(name),
                page.page_number,
                page.recognized,
                csv_field(&page.text)
            ));
        }
    }
    out
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ASSEMBLED: &str = "=== Page 1 ===\nfirst page\n\n=== Page 2 (OCR) ===\nsecond, \"quoted\"\n";

    #[test]
    fn parses_format_names() {
        assert_eq!("txt".parse::<ExportFormat>().unwrap(), ExportFormat::Text);
        assert_eq!("MD".parse::<ExportFormat>().unwrap(), ExportFormat::Markdown);
        assert_eq!("csv".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!("json".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert!(matches!(
            "docx".parse::<ExportFormat>(),
            Err(ScribeError::UnknownFormat(f)) if f == "docx"
        ));
    }

    #[test]
    fn extensions() {
        assert_eq!(ExportFormat::Markdown.extension(), "md");
        assert_eq!(ExportFormat::Csv.to_string(), "csv");
    }

    #[test]
    fn text_is_passed_through() {
        let out = ExportFormat::Text.render_document("doc", ASSEMBLED).unwrap();
        assert_eq!(out, ASSEMBLED);
    }

    #[test]
    fn markdown_rewrites_headers() {
        let out = ExportFormat::Markdown.render_document("report.pdf", ASSEMBLED).unwrap();
        assert!(out.starts_with("# report.pdf\n\n## Page 1\nfirst page"));
        assert!(out.contains("## Page 2 (OCR)\nsecond"));
        assert!(!out.contains("==="));
    }

    #[test]
    fn csv_recovers_pages_and_escapes() {
        let out = ExportFormat::Csv.render_document("doc.pdf", ASSEMBLED).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "file,page,ocr,text");
        assert_eq!(lines[1], "doc.pdf,1,false,first page");
        assert_eq!(lines[2], "doc.pdf,2,true,\"second, \"\"quoted\"\"\"");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn csv_yields_no_rows_for_foreign_headers() {
        let foreign = "--- Page 1 ---\nsome text\n";
        let out = ExportFormat::Csv.render_document("doc", foreign).unwrap();
        assert_eq!(out, "file,page,ocr,text\n");
    }

    #[test]
    fn json_document_round_trips_fields() {
        let out = ExportFormat::Json.render_document("doc", "body").unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["name"], "doc");
        assert_eq!(value["content"], "body");
        assert_eq!(value["success"], true);
    }

    fn file_result(name: &str, content: &str, success: bool) -> FileResult {
        FileResult {
            name: name.into(),
            content: content.into(),
            success,
        }
    }

    #[test]
    fn single_result_json_keeps_failure_flag() {
        let failed = file_result("bad.pdf", "[processing failed: broken]", false);
        let out = ExportFormat::Json.render_result(&failed).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["name"], "bad.pdf");
        assert_eq!(value["success"], false);
    }

    #[test]
    fn batch_text_uses_file_sections() {
        let results = vec![
            file_result("a.pdf", "A", true),
            file_result("b.pdf", "[processing failed: bad]", false),
        ];
        let out = ExportFormat::Text.render_batch(&results).unwrap();
        assert_eq!(out, "##### a.pdf #####\nA\n\n##### b.pdf #####\n[processing failed: bad]\n");
    }

    #[test]
    fn batch_csv_skips_failed_files() {
        let results = vec![
            file_result("a.pdf", ASSEMBLED, true),
            file_result("b.pdf", "[processing failed: bad]", false),
        ];
        let out = ExportFormat::Csv.render_batch(&results).unwrap();
        assert_eq!(out.lines().count(), 3);
        assert!(!out.contains("b.pdf"));
    }

    #[test]
    fn batch_json_is_an_array() {
        let results = vec![file_result("a", "A", true)];
        let out = ExportFormat::Json.render_batch(&results).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value.as_array().map(Vec::len), Some(1));
    }

    #[test]
    fn split_pages_ignores_preamble() {
        let pages = split_pages("preamble\n=== Page 3 ===\nbody\n");
        assert_eq!(
            pages,
            vec![ExportedPage { page_number: 3, recognized: false, text: "body".into() }]
        );
    }
}
