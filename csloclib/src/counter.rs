//! Comment stripping and SLOC classification.
//!
//! The counter is a lightweight heuristic, not a tokenizer: comment tokens
//! inside string literals are treated as comments, and that is accepted. A
//! line counts as SLOC when, after comment removal, it contains at least one
//! identifier-class character (ASCII letter, digit, or underscore). Blank
//! lines, comment-only lines, and pure punctuation lines (a lone `{`) do not
//! count — the punctuation rule is deliberate, reproducible behavior.

use crate::error::CountError;

/// Default cap on logical lines per file; exceeding it is a per-file error.
pub const DEFAULT_MAX_LINES_PER_FILE: usize = 128 * 1024;

/// Comment tokens recognized by the counter: one single-line token and one
/// balanced block token pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentSyntax {
    /// Single-line comment token; text from here to the next line terminator
    /// is removed
    pub line: String,
    /// Block comment opening token
    pub block_open: String,
    /// Block comment closing token
    pub block_close: String,
}

impl CommentSyntax {
    /// C-family comments: `//` and `/* ... */`.
    pub fn c_family() -> Self {
        Self {
            line: "//".to_string(),
            block_open: "/*".to_string(),
            block_close: "*/".to_string(),
        }
    }
}

impl Default for CommentSyntax {
    fn default() -> Self {
        Self::c_family()
    }
}

/// Count source lines of code in decoded file text.
///
/// Steps, in order: strip single-line comments, strip balanced block
/// comments, split at line terminators (at most `max_lines`), then classify
/// each logical line. An unterminated block comment or an over-long file is a
/// recoverable [`CountError`] for that file, never a process abort.
pub fn count_sloc(
    text: &str,
    syntax: &CommentSyntax,
    max_lines: usize,
) -> Result<usize, CountError> {
    let text = strip_line_comments(text, &syntax.line);
    let text = strip_block_comments(&text, &syntax.block_open, &syntax.block_close)?;

    let terminators = line_terminators(&text, max_lines)?;

    // `terminators.len() + 1` logical lines, including a possibly empty
    // trailing line; count the ones that qualify.
    let mut sloc = 0;
    let mut line_start = 0;
    for position in terminators.iter().copied().chain([text.len()]) {
        if line_has_code(&text[line_start..position]) {
            sloc += 1;
        }
        line_start = position + 1;
    }

    Ok(sloc)
}

/// Remove every single-line comment, keeping the line terminator.
fn strip_line_comments(text: &str, token: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(position) = rest.find(token) {
        out.push_str(&rest[..position]);
        match rest[position..].find('\n') {
            Some(newline) => rest = &rest[position + newline..],
            None => return out,
        }
    }
    out.push_str(rest);
    out
}

/// Remove every balanced block comment region, terminators included.
///
/// An open token with no matching close token before end of text is a parse
/// error for the file.
fn strip_block_comments(text: &str, open: &str, close: &str) -> Result<String, CountError> {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(position) = rest.find(open) {
        out.push_str(&rest[..position]);
        let body = &rest[position + open.len()..];
        match body.find(close) {
            Some(end) => rest = &body[end + close.len()..],
            None => return Err(CountError::UnterminatedBlockComment),
        }
    }
    out.push_str(rest);
    Ok(out)
}

/// Byte offsets of every `\n` in the text, capped at `max_lines`.
fn line_terminators(text: &str, max_lines: usize) -> Result<Vec<usize>, CountError> {
    let mut positions = Vec::new();
    for (offset, byte) in text.bytes().enumerate() {
        if byte == b'\n' {
            positions.push(offset);
        }
    }
    if positions.len() >= max_lines {
        return Err(CountError::TooManyLines {
            found: positions.len() + 1,
            limit: max_lines,
        });
    }
    Ok(positions)
}

/// Whether a logical line counts as SLOC: non-blank after leading whitespace,
/// with at least one identifier-class character.
fn line_has_code(line: &str) -> bool {
    let trimmed = line.trim_start();
    !trimmed.is_empty() && trimmed.bytes().any(is_identifier_byte)
}

fn is_identifier_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(text: &str) -> Result<usize, CountError> {
        count_sloc(text, &CommentSyntax::c_family(), DEFAULT_MAX_LINES_PER_FILE)
    }

    #[test]
    fn test_empty_text() {
        assert_eq!(count("").unwrap(), 0);
    }

    #[test]
    fn test_blank_lines_only() {
        assert_eq!(count("\n\n   \n\t\n").unwrap(), 0);
    }

    #[test]
    fn test_comment_only_file() {
        let text = "// first\n/* second\nthird */\n// fourth\n";
        assert_eq!(count(text).unwrap(), 0);
    }

    #[test]
    fn test_code_lines_count_regardless_of_order() {
        let text = "int a;\n\n// note\nint b;\n   \nint c;\n";
        assert_eq!(count(text).unwrap(), 3);

        let reordered = "int c;\n// note\nint a;\nint b;\n\n   \n";
        assert_eq!(count(reordered).unwrap(), 3);
    }

    #[test]
    fn test_indentation_does_not_matter() {
        assert_eq!(count("\tint a;\n        int b;\n").unwrap(), 2);
    }

    #[test]
    fn test_punctuation_only_line_excluded() {
        // Not blank, not a comment — still no identifier characters.
        assert_eq!(count("{\n}\n;;\n(*)\n").unwrap(), 0);
    }

    #[test]
    fn test_spec_example_mixed_file() {
        let text = "int x;\n\n// comment\n{\nreturn x;";
        assert_eq!(count(text).unwrap(), 2);
    }

    #[test]
    fn test_file_wrapped_in_block_comment() {
        let mut text = String::from("/*\n");
        for _ in 0..8 {
            text.push_str("int hidden;\n");
        }
        text.push_str("*/");
        assert_eq!(count(&text).unwrap(), 0);
    }

    #[test]
    fn test_unterminated_block_comment_is_per_file_error() {
        let text = "int a;\n/* never closed\nint b;\n";
        assert_eq!(count(text), Err(CountError::UnterminatedBlockComment));
    }

    #[test]
    fn test_line_comment_stripped_before_block_scan() {
        // The `/*` is swallowed by the single-line strip, so no block
        // comment is ever opened.
        let text = "int a; // trailing /* open\nint b;\n";
        assert_eq!(count(text).unwrap(), 2);
    }

    #[test]
    fn test_block_comment_joining_lines() {
        // Removing the balanced region splices the surrounding text into one
        // logical line.
        let text = "int a; /* span\nstill comment */ int b;\n";
        assert_eq!(count(text).unwrap(), 1);
    }

    #[test]
    fn test_line_comment_at_end_without_newline() {
        assert_eq!(count("int a;\n// tail comment").unwrap(), 1);
    }

    #[test]
    fn test_first_line_whitespace_only_excluded() {
        // Line 1 is classified like every other line.
        assert_eq!(count("   \nint a;\n").unwrap(), 1);
        assert_eq!(count("\t\t\nint a;\nint b;\n").unwrap(), 2);
    }

    #[test]
    fn test_trailing_line_without_terminator_counts() {
        assert_eq!(count("int a;\nint b;").unwrap(), 2);
    }

    #[test]
    fn test_crlf_terminators() {
        // The classifier splits on \n; the stray \r is whitespace-ish
        // punctuation and never an identifier character.
        assert_eq!(count("int a;\r\nint b;\r\n\r\n").unwrap(), 2);
    }

    #[test]
    fn test_too_many_lines_is_per_file_error() {
        let text = "x;\n".repeat(64);
        assert_eq!(
            count_sloc(&text, &CommentSyntax::c_family(), 16),
            Err(CountError::TooManyLines {
                found: 65,
                limit: 16
            })
        );
    }

    #[test]
    fn test_underscore_counts_as_identifier() {
        assert_eq!(count("_\n").unwrap(), 1);
    }
}
