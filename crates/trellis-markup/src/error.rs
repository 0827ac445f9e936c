use std::fmt;

// ── Position ──────────────────────────────────────────────────────────────

/// 1-based line and column in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Position {
    pub line: usize,
    pub col: usize,
}

impl Position {
    pub const START: Position = Position { line: 1, col: 1 };

    pub fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

// ── ErrorKind ─────────────────────────────────────────────────────────────

/// What went wrong, independent of where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    UnterminatedComment,
    /// Input ended between `<name` and `>`.
    UnterminatedTag,
    UnterminatedValue,
    /// Input ended before `</name>`.
    UnclosedTag(String),
    MismatchedClose { expected: String, found: String },
    /// A `</name>` with no open tag.
    StrayClose(String),
    DuplicateAttribute { tag: String, attribute: String },
    /// Non-blank character data at document level.
    TextOutsideTag,
    /// Any other token or character the grammar does not allow here.
    Unexpected(String),
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::UnterminatedComment => f.write_str("unterminated comment"),
            ErrorKind::UnterminatedTag => f.write_str("unterminated tag"),
            ErrorKind::UnterminatedValue => f.write_str("unterminated attribute value"),
            ErrorKind::UnclosedTag(name) => write!(f, "unclosed tag <{name}>"),
            ErrorKind::MismatchedClose { expected, found } => {
                write!(f, "mismatched closing tag: expected </{expected}>, got </{found}>")
            }
            ErrorKind::StrayClose(name) => write!(f, "closing tag </{name}> has no matching open tag"),
            ErrorKind::DuplicateAttribute { tag, attribute } => {
                write!(f, "duplicate attribute {attribute:?} on <{tag}>")
            }
            ErrorKind::TextOutsideTag => f.write_str("text outside of any tag"),
            ErrorKind::Unexpected(detail) => f.write_str(detail),
        }
    }
}

// ── ParseError ────────────────────────────────────────────────────────────

/// A syntax error in Trellis markup, located at the offending token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub kind: ErrorKind,
    pub at: Position,
}

impl ParseError {
    pub(crate) fn at(at: Position, kind: ErrorKind) -> Self {
        Self { kind, at }
    }

    pub fn line(&self) -> usize {
        self.at.line
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "markup error at {}: {}", self.at, self.kind)
    }
}

impl std::error::Error for ParseError {}
