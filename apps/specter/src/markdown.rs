//! Fenced code block extraction from markdown text.
//!
//! Only blocks opened by a line of the form ```` ```<lang> ```` and closed by
//! a line starting with ```` ``` ```` are recognized. Both fence lines may be
//! indented by up to three spaces, as inside list items; content lines lose
//! the opening fence's indentation. An unterminated fence simply ends the
//! sequence; extraction never fails on malformed markdown.

use crate::error::Result;
use crate::models::Block;
use regex::{CaptureMatches, Regex};
use std::borrow::Cow;
use std::path::Path;

/// Remove carriage returns so line offsets do not depend on the platform
/// the markdown was written on.
pub fn normalize_line_endings(text: &str) -> Cow<'_, str> {
    if text.contains('\r') {
        Cow::Owned(text.replace('\r', ""))
    } else {
        Cow::Borrowed(text)
    }
}

/// Compiled matcher for one fence language.
pub struct Extractor {
    fence: Regex,
}

impl Extractor {
    pub fn new(lang: &str) -> Result<Self> {
        let pattern = format!(
            r"(?ms)^( {{0,3}})```{}[ \t]*\n(.*?)^ {{0,3}}```",
            regex::escape(lang)
        );
        Ok(Extractor {
            fence: Regex::new(&pattern)?,
        })
    }

    /// Lazily yield the blocks of `text` in document order.
    ///
    /// `text` must already be normalized with [`normalize_line_endings`].
    pub fn blocks<'r, 't>(&'r self, file: &'t Path, text: &'t str) -> Blocks<'r, 't> {
        Blocks {
            matches: self.fence.captures_iter(text),
            text,
            file,
            scanned: 0,
            newlines: 0,
        }
    }
}

/// Iterator over the fenced blocks of one document.
pub struct Blocks<'r, 't> {
    matches: CaptureMatches<'r, 't>,
    text: &'t str,
    file: &'t Path,
    scanned: usize,
    newlines: usize,
}

impl Iterator for Blocks<'_, '_> {
    type Item = Block;

    fn next(&mut self) -> Option<Block> {
        let caps = self.matches.next()?;
        let whole = caps.get(0)?;
        let indent = caps.get(1).map_or(0, |m| m.len());
        let body = caps.get(2)?;
        // Matches arrive in order, so newline counting resumes where the
        // previous block left off.
        self.newlines += self.text[self.scanned..whole.start()].matches('\n').count();
        self.scanned = whole.start();
        Some(Block {
            content: dedent(body.as_str(), indent),
            // fence line is `newlines + 1`, first content line one after
            line: self.newlines + 2,
            file: self.file.to_path_buf(),
        })
    }
}

/// Strip up to `width` leading spaces from every line.
fn dedent(body: &str, width: usize) -> String {
    if width == 0 {
        return body.to_string();
    }
    body.split_inclusive('\n')
        .map(|line| {
            let spaces = line.len() - line.trim_start_matches(' ').len();
            &line[spaces.min(width)..]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(text: &str) -> Vec<Block> {
        let ex = Extractor::new("yaml").unwrap();
        let text = normalize_line_endings(text);
        ex.blocks(Path::new("doc.md"), &text).collect()
    }

    #[test]
    fn test_extract_blocks_with_lines() {
        let md = "# Title\n\nSome text.\n\n```yaml\na: 1\nb: 2\n```\n\nMore.\n```yaml\nc: 3\n```\n";
        let blocks = collect(md);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].content, "a: 1\nb: 2\n");
        assert_eq!(blocks[0].line, 6);
        assert_eq!(blocks[1].content, "c: 3\n");
        assert_eq!(blocks[1].line, 12);
    }

    #[test]
    fn test_other_languages_are_ignored() {
        let md = "```json\n{}\n```\n```yaml\nx: 1\n```\n";
        let blocks = collect(md);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].content, "x: 1\n");
        assert_eq!(blocks[0].line, 5);
    }

    #[test]
    fn test_carriage_returns_do_not_shift_lines() {
        let unix = collect("intro\n\n```yaml\na: 1\n```\n");
        let dos = collect("intro\r\n\r\n```yaml\r\na: 1\r\n```\r\n");
        assert_eq!(unix, dos);
        assert_eq!(dos[0].line, 4);
    }

    #[test]
    fn test_unterminated_fence_yields_nothing_more() {
        let md = "```yaml\na: 1\n```\n\n```yaml\nb: 2\n";
        let blocks = collect(md);
        assert_eq!(blocks.len(), 1);
    }

    #[test]
    fn test_indented_fence_in_list_item() {
        let md = "- example:\n\n   ```yaml\n   info:\n     title: x\n   ```\n";
        let blocks = collect(md);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].content, "info:\n  title: x\n");
        assert_eq!(blocks[0].line, 4);
    }

    #[test]
    fn test_four_space_indent_is_not_a_fence() {
        assert!(collect("    ```yaml\n    a: 1\n    ```\n").is_empty());
    }

    #[test]
    fn test_empty_block() {
        let blocks = collect("```yaml\n```\n");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].content, "");
        assert_eq!(blocks[0].line, 2);
    }
}
