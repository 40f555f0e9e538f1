// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Writing rendered transcriptions to stdout, a file, or a directory.

use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};

use pagescribe_core::error::Result;
use pagescribe_core::FileResult;
use pagescribe_pipeline::ExportFormat;
use tracing::{info, warn};

/// Where a job's output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Stdout,
    File(PathBuf),
    /// One `<stem>.<ext>` file per document.
    Directory(PathBuf),
}

impl OutputTarget {
    pub fn new(output: Option<PathBuf>, output_dir: Option<PathBuf>) -> Self {
        match (output, output_dir) {
            (Some(file), _) => Self::File(file),
            (None, Some(dir)) => Self::Directory(dir),
            (None, None) => Self::Stdout,
        }
    }

    /// Write one transcribed document. Returns the file written, if any.
    pub fn write_document(
        &self,
        format: ExportFormat,
        name: &str,
        text: &str,
    ) -> Result<Option<PathBuf>> {
        let rendered = format.render_document(name, text)?;
        match self {
            Self::Stdout => {
                write_stdout(&rendered)?;
                Ok(None)
            }
            Self::File(path) => {
                write_file(path, &rendered)?;
                Ok(Some(path.clone()))
            }
            Self::Directory(dir) => {
                let path = output_file_name(dir, name, format);
                write_file(&path, &rendered)?;
                Ok(Some(path))
            }
        }
    }

    /// Write a batch registry: combined for stdout and files, one file per
    /// document for a directory. Documents sharing a stem get numbered names.
    pub fn write_batch(
        &self,
        format: ExportFormat,
        results: &[FileResult],
    ) -> Result<Vec<PathBuf>> {
        match self {
            Self::Stdout => {
                write_stdout(&format.render_batch(results)?)?;
                Ok(Vec::new())
            }
            Self::File(path) => {
                write_file(path, &format.render_batch(results)?)?;
                Ok(vec![path.clone()])
            }
            Self::Directory(dir) => {
                let mut written = Vec::with_capacity(results.len());
                let mut taken = HashSet::new();
                for result in results {
                    let path = unique_file_name(dir, &result.name, format, &mut taken);
                    write_file(&path, &format.render_result(result)?)?;
                    written.push(path);
                }
                Ok(written)
            }
        }
    }
}

/// `<dir>/<stem of name>.<ext>`.
pub fn output_file_name(dir: &Path, name: &str, format: ExportFormat) -> PathBuf {
    let stem = Path::new(name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "document".to_string());
    dir.join(format!("{stem}.{}", format.extension()))
}

/// Like [`output_file_name`], but appends `-2`, `-3`, ... to stems already
/// used in this batch.
fn unique_file_name(
    dir: &Path,
    name: &str,
    format: ExportFormat,
    taken: &mut HashSet<PathBuf>,
) -> PathBuf {
    let first = output_file_name(dir, name, format);
    if taken.insert(first.clone()) {
        return first;
    }
    let stem = first
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut n = 2;
    loop {
        let candidate = dir.join(format!("{stem}-{n}.{}", format.extension()));
        if taken.insert(candidate.clone()) {
            warn!(name, path = %candidate.display(), "Duplicate output name, numbering it");
            return candidate;
        }
        n += 1;
    }
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, contents)?;
    info!(path = %path.display(), bytes = contents.len(), "Wrote output");
    Ok(())
}

fn write_stdout(contents: &str) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(contents.as_bytes())?;
    if !contents.ends_with('\n') {
        stdout.write_all(b"\n")?;
    }
    stdout.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const TEXT: &str = "=== Page 1 ===\nHello world.\n";

    fn entry(name: &str, content: &str, success: bool) -> FileResult {
        FileResult {
            name: name.into(),
            content: content.into(),
            success,
        }
    }

    #[test]
    fn target_prefers_explicit_file() {
        assert_eq!(OutputTarget::new(None, None), OutputTarget::Stdout);
        assert_eq!(
            OutputTarget::new(Some("a.txt".into()), None),
            OutputTarget::File("a.txt".into())
        );
        assert_eq!(
            OutputTarget::new(None, Some("out".into())),
            OutputTarget::Directory("out".into())
        );
    }

    #[test]
    fn file_name_uses_stem_and_extension() {
        let dir = Path::new("/out");
        assert_eq!(
            output_file_name(dir, "report.final.pdf", ExportFormat::Markdown),
            PathBuf::from("/out/report.final.md")
        );
        assert_eq!(
            output_file_name(dir, "", ExportFormat::Csv),
            PathBuf::from("/out/document.csv")
        );
    }

    #[test]
    fn writes_document_into_directory() {
        let dir = tempfile::tempdir().unwrap();
        let target = OutputTarget::Directory(dir.path().join("nested"));

        let path = target
            .write_document(ExportFormat::Text, "scan.pdf", TEXT)
            .unwrap()
            .unwrap();
        assert_eq!(path, dir.path().join("nested/scan.txt"));
        assert_eq!(fs::read_to_string(path).unwrap(), TEXT);
    }

    #[test]
    fn batch_to_file_is_combined() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("all.txt");
        let results = vec![entry("a.pdf", TEXT, true), entry("b.pdf", TEXT, true)];

        let written = OutputTarget::File(path.clone())
            .write_batch(ExportFormat::Text, &results)
            .unwrap();
        assert_eq!(written, vec![path.clone()]);
        let combined = fs::read_to_string(path).unwrap();
        assert!(combined.contains("##### a.pdf #####"));
        assert!(combined.contains("##### b.pdf #####"));
    }

    #[test]
    fn failed_entries_keep_their_flag_in_directory_json() {
        let dir = tempfile::tempdir().unwrap();
        let results = vec![entry("bad.pdf", "[processing failed: broken]", false)];

        OutputTarget::Directory(dir.path().to_path_buf())
            .write_batch(ExportFormat::Json, &results)
            .unwrap();
        let json = fs::read_to_string(dir.path().join("bad.json")).unwrap();
        assert!(json.contains("\"success\": false"), "{json}");
        assert!(json.contains("[processing failed: broken]"));
    }

    #[test]
    fn same_stem_inputs_do_not_overwrite_each_other() {
        let dir = tempfile::tempdir().unwrap();
        let results = vec![
            entry("x.pdf", "first", true),
            entry("x.pdf", "second", true),
            entry("x.pdf", "third", true),
        ];

        let written = OutputTarget::Directory(dir.path().to_path_buf())
            .write_batch(ExportFormat::Text, &results)
            .unwrap();
        let expected: Vec<PathBuf> = ["x.txt", "x-2.txt", "x-3.txt"]
            .iter()
            .map(|name| dir.path().join(name))
            .collect();
        assert_eq!(written, expected);
        assert_eq!(fs::read_to_string(dir.path().join("x.txt")).unwrap(), "first");
        assert_eq!(fs::read_to_string(dir.path().join("x-3.txt")).unwrap(), "third");
    }

    #[test]
    fn batch_to_directory_writes_one_file_each() {
        let dir = tempfile::tempdir().unwrap();
        let results = vec![entry("a.pdf", TEXT, true), entry("b.pdf", TEXT, false)];

        let written = OutputTarget::Directory(dir.path().to_path_buf())
            .write_batch(ExportFormat::Json, &results)
            .unwrap();
        assert_eq!(written.len(), 2);
        assert!(dir.path().join("a.json").exists());
        assert!(dir.path().join("b.json").exists());
    }
}
