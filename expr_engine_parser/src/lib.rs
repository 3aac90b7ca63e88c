//! expr_engine_parser
//!
//! Character-level tokenizer for the arithmetic expression grammar: a
//! generic longest-prefix matcher over operator tokens ([`PrefixTree`])
//! feeding a [`Tokenizer`] that recognizes parens, commas, operators,
//! numerals, and words. Deliberately ignorant of what any of these mean —
//! the evaluating crate (`expr_engine`) owns the registry of what
//! operators and builtins exist and drives the Shunting Yard from the
//! token stream this crate produces.

pub mod error;
pub mod prefix_tree;
pub mod span;
pub mod token;
pub mod tokenizer;

pub use error::{TokenError, TokenResult};
pub use prefix_tree::PrefixTree;
pub use span::Span;
pub use token::{SpannedToken, TokenKind};
pub use tokenizer::Tokenizer;
