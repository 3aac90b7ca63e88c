//! Tokenizer-level error type.

use thiserror::Error;

use crate::span::Span;

/// Failure raised while scanning a character stream into tokens.
///
/// Unlike the structural/semantic errors raised by the evaluating crate
/// (bad arity, mismatched parens, cycles, …), a `TokenError` only ever
/// signals that the tokenizer itself gave up — it carries no opinion
/// about grammar above the character level.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TokenError {
    /// The stream stopped at a byte sequence recognized by none of the
    /// delimiter, operator, number, or word rules.
    #[error("unrecognized input at {span:?}")]
    UnrecognizedInput { span: Span },

    /// A numeric literal's text matched neither the integer nor the
    /// decimal-real grammar.
    #[error("invalid numeric literal '{text}' at {span:?}")]
    InvalidNumber { text: String, span: Span },
}

impl TokenError {
    pub fn span(&self) -> Span {
        match self {
            TokenError::UnrecognizedInput { span } => *span,
            TokenError::InvalidNumber { span, .. } => *span,
        }
    }
}

pub type TokenResult<T> = Result<T, TokenError>;
