// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Text reconstruction: turns raw page text (text layer or OCR output) into
// readable paragraphs.
//
// Stages, each switchable through `ReconstructionOptions`:
//
// 1. whitespace normalization
// 2. punctuation fixes (CJK spacing, Latin spacing, quotes, dashes)
// 3. paragraph merging of hard-wrapped lines
// 4. paragraph formatting (CJK indent, blank line between paragraphs)

use std::sync::LazyLock;

use pagescribe_core::ReconstructionOptions;
use regex::Regex;

/// Lines shorter than this may be headings.
const HEADING_MAX_CHARS: usize = 20;
/// How many leading characters decide whether a paragraph is CJK.
const CJK_PROBE_CHARS: usize = 10;
/// Full-width double space used to indent CJK paragraphs.
const CJK_INDENT: &str = "\u{3000}\u{3000}";

static HORIZONTAL_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));
static BLANK_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{4,}").expect("blank run pattern is valid"));
static PARAGRAPH_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n").expect("paragraph break pattern is valid"));
static SPACE_AFTER_CJK_PUNCT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([，。！？；：、）】」』》〉])[^\S\n]+").expect("CJK punctuation pattern is valid")
});
static LATIN_PUNCT_LETTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([.,;:!?])([A-Za-z])").expect("Latin punctuation pattern is valid")
});
static DASH_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[—―]+|-{2,}").expect("dash pattern is valid"));
static NUMBERED_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:(?i:chapter|section)\s+(?:\d+|(?i:[ivxlcdm]+))\b|第[0-9〇零一二三四五六七八九十百千两]+[章节節])",
    )
    .expect("heading pattern is valid")
});
static LIST_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:\d+[.)](?:\s|$)|\d+、|[A-Za-z][.)]\s|\(\s*[0-9A-Za-z]{1,3}\s*\)|（[0-9A-Za-z一二三四五六七八九十]{1,3}）|[•·●▪◦]|[-*]\s|[①-⑳])",
    )
    .expect("list marker pattern is valid")
});

/// Applies the reconstruction stages selected by its options.
#[derive(Debug, Clone, Default)]
pub struct TextReconstructor {
    options: ReconstructionOptions,
}

impl TextReconstructor {
    pub fn new(options: ReconstructionOptions) -> Self {
        Self { options }
    }

    /// Reconstruct raw page text. Returns the input unchanged when
    /// `auto_format` is off.
    pub fn process(&self, raw: &str) -> String {
        if !self.options.auto_format {
            return raw.to_string();
        }

        let mut text = raw.to_string();
        if self.options.remove_duplicate_spaces {
            text = normalize_whitespace(&text);
        }
        if self.options.fix_punctuation {
            text = fix_punctuation(&text);
        }

        let paragraphs = if self.options.merge_paragraphs {
            merge_paragraphs(&text, self.options.line_break_threshold)
        } else {
            split_paragraphs(&text)
        };
        format_paragraphs(&paragraphs)
    }
}

// -- Stage 1: whitespace ------------------------------------------------------

/// Trim every line, collapse inner whitespace runs to one space and squeeze
/// three or more blank lines down to one.
pub fn normalize_whitespace(text: &str) -> String {
    let lines: Vec<String> = text
        .lines()
        .map(|line| HORIZONTAL_SPACE.replace_all(line.trim(), " ").into_owned())
        .collect();
    BLANK_RUN.replace_all(&lines.join("\n"), "\n\n").into_owned()
}

// -- Stage 2: punctuation -----------------------------------------------------

pub fn fix_punctuation(text: &str) -> String {
    let text = SPACE_AFTER_CJK_PUNCT.replace_all(text, "$1");
    let text = LATIN_PUNCT_LETTER.replace_all(&text, "$1 $2");
    let text: String = text
        .chars()
        .map(|c| match c {
            '\u{201C}' | '\u{201D}' | '\u{201E}' => '"',
            '\u{2018}' | '\u{2019}' => '\'',
            other => other,
        })
        .collect();
    DASH_RUN.replace_all(&text, "——").into_owned()
}

// -- Stage 3: paragraph merge -------------------------------------------------

/// Group lines into paragraphs, joining hard-wrapped lines.
pub fn merge_paragraphs(text: &str, line_break_threshold: f32) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut current_is_heading = false;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            flush(&mut current, &mut paragraphs);
            continue;
        }

        let heading = is_heading(line);
        if current.is_empty() {
            current.push_str(line);
            current_is_heading = heading;
            continue;
        }

        let starts_new = current_is_heading
            || ends_sentence(&current)
            || heading
            || is_list_item(line)
            || ends_sentence(line);

        if !starts_new && continues_paragraph(&current, line, line_break_threshold) {
            join_line(&mut current, line);
            continue;
        }

        flush(&mut current, &mut paragraphs);
        current.push_str(line);
        current_is_heading = heading;
    }

    flush(&mut current, &mut paragraphs);
    paragraphs
}

/// Paragraphs separated by blank lines, with their line breaks kept.
fn split_paragraphs(text: &str) -> Vec<String> {
    PARAGRAPH_BREAK
        .split(text)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

fn flush(current: &mut String, paragraphs: &mut Vec<String>) {
    if !current.is_empty() {
        paragraphs.push(std::mem::take(current));
    }
}

/// A line merges when it is longer than half of the averaged length times
/// the line-break threshold.
fn continues_paragraph(paragraph: &str, line: &str, line_break_threshold: f32) -> bool {
    let paragraph_len = paragraph.chars().count() as f32;
    let line_len = line.chars().count() as f32;
    let threshold = (paragraph_len + line_len) / 2.0 * line_break_threshold;
    line_len > threshold / 2.0
}

fn join_line(paragraph: &mut String, line: &str) {
    let latin_seam = paragraph.chars().next_back().is_some_and(is_latin_letter)
        && line.chars().next().is_some_and(is_latin_letter);
    if latin_seam {
        paragraph.push(' ');
    }
    paragraph.push_str(line);
}

/// Short lines that are entirely upper-case, or numbered chapter/section
/// headings.
pub fn is_heading(line: &str) -> bool {
    line.chars().count() < HEADING_MAX_CHARS
        && (line == line.to_uppercase() || NUMBERED_HEADING.is_match(line))
}

pub fn is_list_item(line: &str) -> bool {
    LIST_MARKER.is_match(line)
}

fn ends_sentence(line: &str) -> bool {
    line.trim_end()
        .ends_with(['.', '!', '?', '。', '！', '？', '…'])
}

// -- Stage 4: formatting ------------------------------------------------------

fn format_paragraphs(paragraphs: &[String]) -> String {
    paragraphs
        .iter()
        .map(|p| {
            if p.chars().take(CJK_PROBE_CHARS).any(is_cjk) {
                format!("{CJK_INDENT}{p}")
            } else {
                p.clone()
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

// -- Character classes --------------------------------------------------------

pub fn is_cjk(c: char) -> bool {
    matches!(c,
        '\u{3000}'..='\u{303F}'     // CJK symbols and punctuation
        | '\u{3040}'..='\u{30FF}'   // kana
        | '\u{3400}'..='\u{4DBF}'   // extension A
        | '\u{4E00}'..='\u{9FFF}'   // unified ideographs
        | '\u{AC00}'..='\u{D7AF}'   // hangul
        | '\u{F900}'..='\u{FAFF}'   // compatibility ideographs
        | '\u{FF00}'..='\u{FFEF}'   // full-width forms
    )
}

fn is_latin_letter(c: char) -> bool {
    c.is_ascii_alphabetic()
        || (c.is_alphabetic()
            && matches!(c, '\u{00C0}'..='\u{024F}' | '\u{1E00}'..='\u{1EFF}')
            && c != '\u{00D7}'
            && c != '\u{00F7}')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn only(stage: &str) -> ReconstructionOptions {
        ReconstructionOptions {
            auto_format: true,
            merge_paragraphs: stage == "merge",
            remove_duplicate_spaces: stage == "spaces",
            fix_punctuation: stage == "punct",
            line_break_threshold: 1.5,
        }
    }

    #[test]
    fn auto_format_off_returns_input() {
        let options = ReconstructionOptions {
            auto_format: false,
            ..Default::default()
        };
        let raw = "  messy   text\n\n\n\n\nwith “quotes”  ";
        assert_eq!(TextReconstructor::new(options).process(raw), raw);
    }

    // -- whitespace --

    #[test]
    fn collapses_inner_whitespace_and_trims_lines() {
        let out = TextReconstructor::new(only("spaces")).process("  alpha   beta\t gamma  ");
        assert_eq!(out, "alpha beta gamma");
    }

    #[test]
    fn squeezes_long_blank_runs_only() {
        assert_eq!(normalize_whitespace("one\n\n\n\n\ntwo"), "one\n\ntwo");
        assert_eq!(normalize_whitespace("one\n \n\t\n \ntwo"), "one\n\ntwo");
        assert_eq!(normalize_whitespace("one\n\n\ntwo"), "one\n\n\ntwo");
    }

    // -- punctuation --

    #[test]
    fn drops_space_after_cjk_punctuation() {
        assert_eq!(fix_punctuation("你好， 世界。 再见"), "你好，世界。再见");
    }

    #[test]
    fn spaces_latin_punctuation_before_letters() {
        assert_eq!(fix_punctuation("end.Next,word"), "end. Next, word");
        assert_eq!(fix_punctuation("pi is 3.14"), "pi is 3.14");
    }

    #[test]
    fn straightens_curly_quotes() {
        assert_eq!(
            fix_punctuation("\u{201C}quoted\u{201D} \u{2018}single\u{2019}"),
            "\"quoted\" 'single'"
        );
    }

    #[test]
    fn normalizes_dash_runs() {
        assert_eq!(fix_punctuation("wait---what"), "wait——what");
        assert_eq!(fix_punctuation("a—b"), "a——b");
        assert_eq!(fix_punctuation("a——b"), "a——b");
        assert_eq!(fix_punctuation("well-known"), "well-known");
    }

    // -- paragraph merge --

    #[test]
    fn terminal_punctuation_closes_paragraph() {
        let out = TextReconstructor::new(only("merge")).process("Hello world.\nNext line");
        assert_eq!(out, "Hello world.\n\nNext line");
    }

    #[test]
    fn latin_lines_merge_with_one_space() {
        let raw = "The quick brown fox jumps over\nthe lazy dog sleeping soundly";
        let out = TextReconstructor::new(only("merge")).process(raw);
        assert_eq!(out, "The quick brown fox jumps over the lazy dog sleeping soundly");
    }

    #[test]
    fn cjk_lines_merge_without_space() {
        let first = "这是一个很长的句子用来测试段落合并功能是否正常工作";
        let second = "后面这一行继续上一行的内容并且没有任何标点符号结尾";
        let out = TextReconstructor::new(only("merge")).process(&format!("{first}\n{second}"));
        assert_eq!(out, format!("{CJK_INDENT}{first}{second}"));
    }

    #[test]
    fn short_trailing_line_starts_new_paragraph() {
        let out = TextReconstructor::new(only("merge"))
            .process("This is a fairly long line of prose text\nok");
        assert_eq!(out, "This is a fairly long line of prose text\n\nok");
    }

    #[test]
    fn headings_stand_alone() {
        let out = TextReconstructor::new(only("merge"))
            .process("INTRODUCTION\nthe body of the text continues on here");
        assert_eq!(out, "INTRODUCTION\n\nthe body of the text continues on here");
    }

    #[test]
    fn list_items_start_paragraphs() {
        let raw = "Shopping list for the weekend trip\n1. apples and pears and bananas\n2) oranges";
        let paragraphs = merge_paragraphs(raw, 1.5);
        assert_eq!(paragraphs.len(), 3);
        assert_eq!(paragraphs[2], "2) oranges");
    }

    #[test]
    fn blank_line_always_closes() {
        let raw = "The quick brown fox jumps over\n\nthe lazy dog sleeping soundly";
        assert_eq!(merge_paragraphs(raw, 1.5).len(), 2);
    }

    #[test]
    fn heading_detection() {
        assert!(is_heading("Chapter 3"));
        assert!(is_heading("Section 12: Scope"));
        assert!(is_heading("第三章 总则"));
        assert!(is_heading("第2节"));
        assert!(is_heading("SUMMARY"));
        assert!(!is_heading("Summary of results"));
        assert!(!is_heading("A VERY LONG UPPER CASE LINE INDEED"));
    }

    #[test]
    fn list_marker_detection() {
        let items = [
            "1. one", "12) twelve", "a. alpha", "(b) beta", "• dot", "- dash", "* star", "·middle",
            "①first",
        ];
        for item in items {
            assert!(is_list_item(item), "{item} should be a list item");
        }
        assert!(!is_list_item("1.5 million people"));
        assert!(!is_list_item("-5 degrees"));
    }

    // -- formatting --

    #[test]
    fn cjk_paragraphs_are_indented() {
        let out = TextReconstructor::new(only("none")).process("Intro: 中文内容\n\nplain");
        assert_eq!(out, format!("{CJK_INDENT}Intro: 中文内容\n\nplain"));
    }

    #[test]
    fn full_pipeline_on_mixed_text() {
        let raw = "  The quick  brown fox jumps over  \nthe lazy dog.Then it slept\n\n\n\n\n第一章";
        let out = TextReconstructor::new(ReconstructionOptions::default()).process(raw);
        assert_eq!(
            out,
            "The quick brown fox jumps over the lazy dog. Then it slept\n\n\u{3000}\u{3000}第一章"
        );
    }
}
