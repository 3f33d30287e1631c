use thiserror::Error;

/// Errors raised while decoding a catalog.
///
/// A decode error is always local to the one catalog being decoded.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The catalog (or one of its strings) is not valid UTF-8.
    #[error("Catalog is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// A text catalog line could not be parsed.
    #[error("Syntax error at line {line}: {kind}")]
    Syntax {
        /// 1-based line number.
        line: usize,
        /// What went wrong on that line.
        kind: SyntaxError,
    },

    /// The first four bytes are not a binary catalog magic number.
    #[error("Bad magic number {0:#010x}")]
    BadMagic(u32),

    /// The binary catalog declares a major revision this decoder does not know.
    #[error("Unsupported binary catalog revision {0:#x}")]
    UnsupportedRevision(u32),

    /// A header field, descriptor table or string points past the end of the data.
    #[error("Binary catalog truncated while reading {0}")]
    Truncated(&'static str),
}

/// Line-level problems found by the text catalog decoder.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SyntaxError {
    #[error("msgstr without a preceding msgid")]
    OrphanedMsgstr,

    #[error("msgid_plural without a preceding msgid")]
    OrphanedMsgidPlural,

    #[error("msgid is not followed by a msgstr")]
    MissingMsgstr,

    #[error("duplicate {0} in one entry")]
    DuplicateKeyword(&'static str),

    #[error("quoted string continuation outside of any field")]
    DanglingContinuation,

    #[error("unterminated quoted string")]
    UnterminatedString,

    #[error("expected a quoted string")]
    ExpectedString,

    #[error("unexpected content after closing quote: {0:?}")]
    TrailingContent(String),

    #[error("invalid escape sequence: \\{0}")]
    InvalidEscape(char),

    #[error("malformed plural index in msgstr[...]")]
    BadPluralIndex,

    #[error("unknown keyword: {0:?}")]
    UnknownKeyword(String),
}

impl DecodeError {
    pub(crate) fn syntax(line: usize, kind: SyntaxError) -> Self {
        Self::Syntax { line, kind }
    }
}
