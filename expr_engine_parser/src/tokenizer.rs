//! Character-stream scanner.
//!
//! Implements the tokenization rules checked in order on each call to
//! [`Tokenizer::next`]: parens/comma, symbolic operator (longest prefix
//! match, prefix-tree chosen by caller-supplied `last_was_value`),
//! numeral, word. Whitespace (spaces/tabs) is always skipped; newlines
//! are only skipped while inside parentheses — outside, a newline ends
//! the token stream.

use crate::error::TokenResult;
use crate::prefix_tree::PrefixTree;
use crate::span::Span;
use crate::token::{SpannedToken, TokenKind};

pub struct Tokenizer<'a, T> {
    source: &'a str,
    pos: usize,
    paren_depth: i32,
    prefix_ops: &'a PrefixTree<T>,
    infix_ops: &'a PrefixTree<T>,
}

impl<'a, T: Clone> Tokenizer<'a, T> {
    pub fn new(
        source: &'a str,
        prefix_ops: &'a PrefixTree<T>,
        infix_ops: &'a PrefixTree<T>,
    ) -> Self {
        Self {
            source,
            pos: 0,
            paren_depth: 0,
            prefix_ops,
            infix_ops,
        }
    }

    /// Byte offset of the next unread character; used by callers to
    /// report error positions when they abort parsing.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Whether the next significant character is `(`, without consuming
    /// it — used to decide between a function call and a plain value load
    /// after a word token (spec §4.F rule 4). Skipping the intervening
    /// whitespace here is harmless since `next()` would skip it again.
    pub fn peek_is_open_paren(&mut self) -> bool {
        self.skip_whitespace();
        self.rest().starts_with('(')
    }

    fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    fn skip_whitespace(&mut self) {
        loop {
            let mut chars = self.rest().chars();
            match chars.next() {
                Some(' ') | Some('\t') | Some('\r') => {
                    self.pos += 1;
                }
                Some('\n') if self.paren_depth > 0 => {
                    self.pos += 1;
                }
                _ => break,
            }
        }
    }

    /// Scan the longest prefix of `rest` matching `[A-Za-z_][A-Za-z0-9_]*`.
    fn scan_word(rest: &str) -> Option<usize> {
        let mut chars = rest.char_indices();
        let (_, first) = chars.next()?;
        if !(first.is_ascii_alphabetic() || first == '_') {
            return None;
        }
        let mut end = first.len_utf8();
        for (idx, ch) in chars {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                end = idx + ch.len_utf8();
            } else {
                break;
            }
        }
        Some(end)
    }

    /// Scan a numeral: integer grammar `[0-9]+`, decimal grammar
    /// `[0-9]+\.[0-9]+`. Returns the longer of the two matches along with
    /// whether it is the integer form.
    fn scan_number(rest: &str) -> Option<(usize, bool)> {
        let bytes = rest.as_bytes();
        let mut int_end = 0;
        while int_end < bytes.len() && bytes[int_end].is_ascii_digit() {
            int_end += 1;
        }
        if int_end == 0 {
            return None;
        }

        if int_end < bytes.len() && bytes[int_end] == b'.' {
            let mut dec_end = int_end + 1;
            while dec_end < bytes.len() && bytes[dec_end].is_ascii_digit() {
                dec_end += 1;
            }
            if dec_end > int_end + 1 {
                return Some((dec_end, false));
            }
        }

        Some((int_end, true))
    }

    /// Produce the next token, or `None` at end of input. `last_was_value`
    /// selects the prefix-position vs. infix-position operator tree and is
    /// owned by the caller (the Shunting Yard's last-token class, spec
    /// §4.D).
    pub fn next(&mut self, last_was_value: bool) -> Option<TokenResult<SpannedToken<'a, T>>> {
        self.skip_whitespace();

        if self.paren_depth == 0 && self.rest().starts_with('\n') {
            return None;
        }
        if self.rest().is_empty() {
            return None;
        }

        let start = self.pos;
        let rest = self.rest();

        if let Some(rest2) = rest.strip_prefix('(') {
            let _ = rest2;
            self.pos += 1;
            self.paren_depth += 1;
            return Some(Ok(SpannedToken {
                kind: TokenKind::LParen,
                span: Span::new(start, self.pos),
            }));
        }
        if rest.starts_with(')') {
            self.pos += 1;
            self.paren_depth = (self.paren_depth - 1).max(0);
            return Some(Ok(SpannedToken {
                kind: TokenKind::RParen,
                span: Span::new(start, self.pos),
            }));
        }
        if rest.starts_with(',') {
            self.pos += 1;
            return Some(Ok(SpannedToken {
                kind: TokenKind::Comma,
                span: Span::new(start, self.pos),
            }));
        }

        let tree = if last_was_value {
            self.infix_ops
        } else {
            self.prefix_ops
        };
        if let Some((payload, len)) = tree.longest_match(rest) {
            self.pos += len;
            return Some(Ok(SpannedToken {
                kind: TokenKind::Operator(payload),
                span: Span::new(start, self.pos),
            }));
        }

        if let Some((len, is_integer)) = Self::scan_number(rest) {
            self.pos += len;
            return Some(Ok(SpannedToken {
                kind: TokenKind::Number {
                    text: &self.source[start..self.pos],
                    is_integer,
                },
                span: Span::new(start, self.pos),
            }));
        }

        if let Some(len) = Self::scan_word(rest) {
            self.pos += len;
            return Some(Ok(SpannedToken {
                kind: TokenKind::Word(&self.source[start..self.pos]),
                span: Span::new(start, self.pos),
            }));
        }

        // A byte sequence none of the delimiter/operator/number/word rules
        // match ends the token stream rather than raising (rule 2): the
        // caller's `clear` then decides whether what came before is a
        // complete expression, and any unconsumed text is left for the
        // slicer to handle as the start of the next one.
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trees() -> (PrefixTree<u8>, PrefixTree<u8>) {
        let infix = PrefixTree::from_entries([
            ("+", 1u8),
            ("-", 2u8),
            ("*", 3u8),
            ("/", 4u8),
            ("//", 5u8),
            ("%", 6u8),
            ("^", 7u8),
        ]);
        let prefix = PrefixTree::from_entries([("-", 8u8)]);
        (prefix, infix)
    }

    #[test]
    fn number_longest_match_prefers_decimal() {
        let (prefix, infix) = trees();
        let mut tk = Tokenizer::new("3.14", &prefix, &infix);
        let tok = tk.next(false).unwrap().unwrap();
        assert_eq!(
            tok.kind,
            TokenKind::Number {
                text: "3.14",
                is_integer: false
            }
        );
    }

    #[test]
    fn integer_without_fraction() {
        let (prefix, infix) = trees();
        let mut tk = Tokenizer::new("42", &prefix, &infix);
        let tok = tk.next(false).unwrap().unwrap();
        assert_eq!(
            tok.kind,
            TokenKind::Number {
                text: "42",
                is_integer: true
            }
        );
    }

    #[test]
    fn minus_is_prefix_or_infix_by_last_token() {
        let (prefix, infix) = trees();
        let mut tk = Tokenizer::new("-", &prefix, &infix);
        assert_eq!(tk.next(false).unwrap().unwrap().kind, TokenKind::Operator(8));
        let mut tk = Tokenizer::new("-", &prefix, &infix);
        assert_eq!(tk.next(true).unwrap().unwrap().kind, TokenKind::Operator(2));
    }

    #[test]
    fn floor_div_beats_div() {
        let (prefix, infix) = trees();
        let mut tk = Tokenizer::new("//", &prefix, &infix);
        assert_eq!(tk.next(true).unwrap().unwrap().kind, TokenKind::Operator(5));
    }

    #[test]
    fn newline_ends_stream_outside_parens() {
        let (prefix, infix) = trees();
        let mut tk = Tokenizer::new("1\n+2", &prefix, &infix);
        assert!(tk.next(false).is_some());
        assert!(tk.next(true).is_none());
    }

    #[test]
    fn newline_is_whitespace_inside_parens() {
        let (prefix, infix) = trees();
        let mut tk = Tokenizer::new("(1\n+2)", &prefix, &infix);
        assert!(matches!(
            tk.next(false).unwrap().unwrap().kind,
            TokenKind::LParen
        ));
        assert!(matches!(
            tk.next(false).unwrap().unwrap().kind,
            TokenKind::Number { .. }
        ));
        assert!(matches!(
            tk.next(true).unwrap().unwrap().kind,
            TokenKind::Operator(1)
        ));
    }

    #[test]
    fn word_token() {
        let (prefix, infix) = trees();
        let mut tk = Tokenizer::new("foo_bar2(", &prefix, &infix);
        assert_eq!(
            tk.next(false).unwrap().unwrap().kind,
            TokenKind::Word("foo_bar2")
        );
    }
}
