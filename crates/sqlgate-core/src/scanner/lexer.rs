//! Segment lexer - splits raw SQL into code, comment and quoted regions

use crate::dialect::LexicalRules;

/// Quoting style of a quoted region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuoteStyle {
    /// `'string'`
    Single,
    /// `"identifier"`
    Double,
    /// `` `identifier` ``
    Backtick,
    /// `[identifier]`
    Bracket,
    /// `$tag$ body $tag$`
    Dollar,
}

impl QuoteStyle {
    pub fn describe(&self) -> &'static str {
        match self {
            QuoteStyle::Single => "single quote (')",
            QuoteStyle::Double => "double quote (\")",
            QuoteStyle::Backtick => "backtick (`)",
            QuoteStyle::Bracket => "bracket ([)",
            QuoteStyle::Dollar => "dollar quote ($$)",
        }
    }

    /// Whether the region holds a string value rather than an identifier
    pub fn is_string(&self, rules: LexicalRules) -> bool {
        match self {
            QuoteStyle::Single | QuoteStyle::Dollar => true,
            QuoteStyle::Double => rules.double_quoted_strings,
            QuoteStyle::Backtick | QuoteStyle::Bracket => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SegmentKind {
    Code,
    LineComment,
    BlockComment,
    Quoted(QuoteStyle),
}

/// A contiguous byte range of the input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Segment {
    pub(crate) kind: SegmentKind,
    pub(crate) start: usize,
    pub(crate) end: usize,
    /// False for a quoted region or block comment that runs off the end of input
    pub(crate) closed: bool,
    /// Length of the opening delimiter (1 for quotes, tag length for dollar quotes)
    pub(crate) open_len: usize,
}

impl Segment {
    pub(crate) fn text<'a>(&self, sql: &'a str) -> &'a str {
        &sql[self.start..self.end]
    }

    pub(crate) fn is_comment(&self) -> bool {
        matches!(
            self.kind,
            SegmentKind::LineComment | SegmentKind::BlockComment
        )
    }
}

/// Split `sql` into segments covering the whole input, in order.
///
/// All delimiters are ASCII, so every segment boundary is a char boundary.
pub(crate) fn segments(sql: &str, rules: LexicalRules) -> Vec<Segment> {
    let bytes = sql.as_bytes();
    let len = bytes.len();
    let mut out = Vec::new();
    let mut code_start = 0;
    let mut i = 0;

    while i < len {
        let next = bytes.get(i + 1).copied();
        let region = match bytes[i] {
            b'-' if next == Some(b'-') => Some(scan_line_comment(bytes, i)),
            b'#' if rules.hash_comments => Some(scan_line_comment(bytes, i)),
            b'/' if next == Some(b'*') => Some(scan_block_comment(bytes, i)),
            b'\'' => Some(scan_quoted(bytes, i, b'\'', QuoteStyle::Single, rules.backslash_escapes)),
            b'"' => Some(scan_quoted(bytes, i, b'"', QuoteStyle::Double, rules.backslash_escapes)),
            b'`' if rules.backtick_identifiers => {
                Some(scan_quoted(bytes, i, b'`', QuoteStyle::Backtick, false))
            }
            b'[' if rules.bracket_identifiers => {
                Some(scan_quoted(bytes, i, b']', QuoteStyle::Bracket, false))
            }
            b'$' if rules.dollar_quoted_strings && !continues_word(bytes, i) => {
                scan_dollar_quoted(sql, i)
            }
            _ => None,
        };

        match region {
            Some(segment) => {
                if code_start < segment.start {
                    out.push(code(code_start, segment.start));
                }
                i = segment.end;
                code_start = segment.end;
                out.push(segment);
            }
            None => i += 1,
        }
    }

    if code_start < len {
        out.push(code(code_start, len));
    }
    out
}

/// Whether the byte at `i` sits inside a word, as in `a$b`
fn continues_word(bytes: &[u8], i: usize) -> bool {
    i > 0 && {
        let prev = bytes[i - 1];
        prev.is_ascii_alphanumeric() || prev == b'_' || prev == b'$' || prev >= 0x80
    }
}

fn code(start: usize, end: usize) -> Segment {
    Segment {
        kind: SegmentKind::Code,
        start,
        end,
        closed: true,
        open_len: 0,
    }
}

/// Line comment up to (not including) the newline
fn scan_line_comment(bytes: &[u8], start: usize) -> Segment {
    let mut i = start;
    while i < bytes.len() && bytes[i] != b'\n' {
        i += 1;
    }
    Segment {
        kind: SegmentKind::LineComment,
        start,
        end: i,
        closed: true,
        open_len: 0,
    }
}

/// Block comment, ending at the first `*/`
fn scan_block_comment(bytes: &[u8], start: usize) -> Segment {
    let len = bytes.len();
    let mut i = start + 2;
    while i + 1 < len {
        if bytes[i] == b'*' && bytes[i + 1] == b'/' {
            return Segment {
                kind: SegmentKind::BlockComment,
                start,
                end: i + 2,
                closed: true,
                open_len: 2,
            };
        }
        i += 1;
    }
    Segment {
        kind: SegmentKind::BlockComment,
        start,
        end: len,
        closed: false,
        open_len: 2,
    }
}

/// Quoted region where a doubled closing character is an escaped literal
fn scan_quoted(
    bytes: &[u8],
    start: usize,
    close: u8,
    style: QuoteStyle,
    backslash_escapes: bool,
) -> Segment {
    let len = bytes.len();
    let mut i = start + 1;
    while i < len {
        let b = bytes[i];
        if backslash_escapes && b == b'\\' {
            i += 2;
            continue;
        }
        if b == close {
            if i + 1 < len && bytes[i + 1] == close {
                i += 2;
                continue;
            }
            return Segment {
                kind: SegmentKind::Quoted(style),
                start,
                end: i + 1,
                closed: true,
                open_len: 1,
            };
        }
        i += 1;
    }
    Segment {
        kind: SegmentKind::Quoted(style),
        start,
        end: len,
        closed: false,
        open_len: 1,
    }
}

/// `$$ ... $$` or `$tag$ ... $tag$`; `None` when `$` does not open a tag (e.g. `$1`)
fn scan_dollar_quoted(sql: &str, start: usize) -> Option<Segment> {
    let tag_end = find_dollar_tag_end(sql, start)?;
    let tag = &sql[start..=tag_end];
    let body_start = tag_end + 1;
    let segment = match sql[body_start..].find(tag) {
        Some(close) => Segment {
            kind: SegmentKind::Quoted(QuoteStyle::Dollar),
            start,
            end: body_start + close + tag.len(),
            closed: true,
            open_len: tag.len(),
        },
        None => Segment {
            kind: SegmentKind::Quoted(QuoteStyle::Dollar),
            start,
            end: sql.len(),
            closed: false,
            open_len: tag.len(),
        },
    };
    Some(segment)
}

/// Index of the `$` closing a dollar-quote tag that starts at `start`
fn find_dollar_tag_end(sql: &str, start: usize) -> Option<usize> {
    let bytes = sql.as_bytes();
    let len = bytes.len();
    let mut i = start + 1;
    if i < len && bytes[i] == b'$' {
        return Some(i);
    }
    // Tags follow identifier rules, so `$1` is a parameter, not a tag
    if i >= len || !(bytes[i].is_ascii_alphabetic() || bytes[i] == b'_') {
        return None;
    }
    while i < len && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
        i += 1;
    }
    if i < len && bytes[i] == b'$' {
        Some(i)
    } else {
        None
    }
}
