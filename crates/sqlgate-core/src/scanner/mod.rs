//! Quote/comment scanner
//!
//! Dialect-aware lexical pass used by every pattern-based check: comment
//! removal, quote and parenthesis balance, string literal masking and batch
//! splitting. Comment markers and parentheses inside quoted regions are
//! ignored, and quote characters inside comments never count.

mod lexer;

pub use lexer::QuoteStyle;

use lexer::{segments, SegmentKind};

use crate::dialect::SqlDialect;

/// Why quoting is unbalanced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteImbalance {
    /// A quoted region opened at `offset` is never closed
    Unclosed { style: QuoteStyle, offset: usize },
    /// A closing delimiter at `offset` has no opening partner
    UnmatchedClose { style: QuoteStyle, offset: usize },
}

/// Why parentheses are unbalanced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParenImbalance {
    /// A `)` at `offset` closes more parentheses than were opened
    UnexpectedClose { offset: usize },
    /// Input ends with `count` parentheses still open
    Unclosed { count: usize },
}

/// Remove line and block comments.
///
/// Each block comment becomes a single space so the tokens around it stay
/// apart; line comments are dropped up to the newline, which is kept.
pub fn strip_comments(sql: &str, dialect: SqlDialect) -> String {
    let mut out = String::with_capacity(sql.len());
    for segment in segments(sql, dialect.lexical_rules()) {
        match segment.kind {
            SegmentKind::LineComment => {}
            SegmentKind::BlockComment => out.push(' '),
            SegmentKind::Code | SegmentKind::Quoted(_) => out.push_str(segment.text(sql)),
        }
    }
    out
}

/// First quoting problem in `sql`, if any
pub fn quote_imbalance(sql: &str, dialect: SqlDialect) -> Option<QuoteImbalance> {
    let rules = dialect.lexical_rules();
    for segment in segments(sql, rules) {
        match segment.kind {
            SegmentKind::Quoted(style) if !segment.closed => {
                return Some(QuoteImbalance::Unclosed {
                    style,
                    offset: segment.start,
                });
            }
            SegmentKind::Code if rules.bracket_identifiers => {
                if let Some(pos) = segment.text(sql).find(']') {
                    return Some(QuoteImbalance::UnmatchedClose {
                        style: QuoteStyle::Bracket,
                        offset: segment.start + pos,
                    });
                }
            }
            _ => {}
        }
    }
    None
}

pub fn quotes_balanced(sql: &str, dialect: SqlDialect) -> bool {
    quote_imbalance(sql, dialect).is_none()
}

/// First parenthesis problem in `sql`, if any.
///
/// Counting is suspended inside quoted regions and comments.
pub fn paren_imbalance(sql: &str, dialect: SqlDialect) -> Option<ParenImbalance> {
    let mut depth: usize = 0;
    for segment in segments(sql, dialect.lexical_rules()) {
        if segment.kind != SegmentKind::Code {
            continue;
        }
        for (pos, byte) in segment.text(sql).bytes().enumerate() {
            match byte {
                b'(' => depth += 1,
                b')' => {
                    if depth == 0 {
                        return Some(ParenImbalance::UnexpectedClose {
                            offset: segment.start + pos,
                        });
                    }
                    depth -= 1;
                }
                _ => {}
            }
        }
    }
    if depth == 0 {
        None
    } else {
        Some(ParenImbalance::Unclosed { count: depth })
    }
}

pub fn parens_balanced(sql: &str, dialect: SqlDialect) -> bool {
    paren_imbalance(sql, dialect).is_none()
}

/// Replace the contents of string literals with spaces.
///
/// Delimiters and byte length are preserved, so offsets into the result are
/// valid offsets into `sql`. Quoted identifiers are left untouched.
pub fn blank_string_literals(sql: &str, dialect: SqlDialect) -> String {
    let rules = dialect.lexical_rules();
    let mut out = String::with_capacity(sql.len());
    for segment in segments(sql, rules) {
        let text = segment.text(sql);
        match segment.kind {
            SegmentKind::Quoted(style) if style.is_string(rules) => {
                let close_len = if segment.closed { segment.open_len } else { 0 };
                let body_end = text.len() - close_len;
                out.push_str(&text[..segment.open_len]);
                out.extend(std::iter::repeat(' ').take(text[segment.open_len..body_end].len()));
                out.push_str(&text[body_end..]);
            }
            _ => out.push_str(text),
        }
    }
    out
}

/// Split a batch on `;`, ignoring semicolons inside quotes and comments.
///
/// Empty and comment-only pieces are dropped.
pub fn split_statements(sql: &str, dialect: SqlDialect) -> Vec<&str> {
    let mut statements = Vec::new();
    let mut start = 0;
    let mut has_content = false;

    for segment in segments(sql, dialect.lexical_rules()) {
        match segment.kind {
            SegmentKind::Code => {
                for (pos, byte) in segment.text(sql).bytes().enumerate() {
                    if byte == b';' {
                        let end = segment.start + pos;
                        if has_content {
                            statements.push(sql[start..end].trim());
                        }
                        start = end + 1;
                        has_content = false;
                    } else if !byte.is_ascii_whitespace() {
                        has_content = true;
                    }
                }
            }
            _ if segment.is_comment() => {}
            _ => has_content = true,
        }
    }

    // Handle last statement (without trailing semicolon)
    if has_content {
        statements.push(sql[start..].trim());
    }
    statements
}

/// Convert byte offset to line and column (1-indexed)
pub fn offset_to_line_col(source: &str, offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut col = 1;

    for (i, ch) in source.char_indices() {
        if i >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }

    (line, col)
}
