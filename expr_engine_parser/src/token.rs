//! Token definitions produced by the [`crate::tokenizer::Tokenizer`].
//!
//! The tokenizer is deliberately ignorant of what an operator *means* —
//! `Operator` just carries whatever payload the caller registered in its
//! [`crate::prefix_tree::PrefixTree`] (the evaluating crate hangs a
//! builtin descriptor off of it). Numbers and words are handed back as
//! raw source spans; interpreting their text (as a `Rational`/`Real`
//! literal, an argument name, a builtin, or a namespace lookup) is the
//! evaluating crate's job.

use crate::span::Span;

/// One lexical token, generic over the payload type carried by matched
/// operators.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind<'a, T> {
    LParen,
    RParen,
    Comma,
    /// A symbolic operator matched against the prefix- or infix-position
    /// [`crate::prefix_tree::PrefixTree`], selected by whether the
    /// previous token was a value (see
    /// [`crate::tokenizer::Tokenizer::next`]).
    Operator(T),
    /// Raw text of a numeral; `is_integer` records whether the
    /// longest-match scan picked the integer grammar or the decimal-real
    /// grammar (spec: "the longer successful match wins").
    Number { text: &'a str, is_integer: bool },
    /// Raw text of an `[A-Za-z_][A-Za-z0-9_]*` run.
    Word(&'a str),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken<'a, T> {
    pub kind: TokenKind<'a, T>,
    pub span: Span,
}
