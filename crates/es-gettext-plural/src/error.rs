use thiserror::Error;

/// Why a `Plural-Forms` header could not be compiled.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PluralRuleError {
    #[error("Plural-Forms header is empty")]
    Empty,

    #[error("Plural-Forms header has no nplurals field")]
    MissingNplurals,

    #[error("Invalid nplurals value '{0}'")]
    InvalidNplurals(String),

    #[error("Plural-Forms header has no plural expression")]
    MissingExpression,

    #[error("Unexpected character '{found}' at offset {offset}")]
    UnexpectedChar { offset: usize, found: char },

    #[error("Unexpected token at offset {offset}")]
    UnexpectedToken { offset: usize },

    #[error("Plural expression ended unexpectedly")]
    UnexpectedEnd,

    #[error("Integer literal out of range at offset {offset}")]
    LiteralOutOfRange { offset: usize },

    #[error("Plural expression nested too deeply at offset {offset}")]
    TooDeep { offset: usize },
}
