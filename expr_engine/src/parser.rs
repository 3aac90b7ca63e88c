//! Tokenizer-driven Shunting Yard feed: the `Word` resolution order
//! (argument name → builtin → namespace lookup-or-create) and the
//! function-call-vs-value-load lookahead live here (component F).
//!
//! Kept deliberately thin: `expr_engine_parser::Tokenizer` knows nothing
//! about operators or names, `ShuntingYard` knows nothing about text —
//! this module is the only place that owns both at once.

use expr_engine_parser::{SpannedToken, TokenError, TokenKind, Tokenizer};

use crate::bytecode::{BlockRef, CodeBlock};
use crate::error::{EngineError, ErrorKind};
use crate::namespace::Namespace;
use crate::registry::{self, Operator};
use crate::scalar::Scalar;
use crate::yard::{LastToken, ShuntingYard};

/// Parse `text` into a completed Code Block. `arg_names` are the
/// parameter names in scope (empty for a zero-arity definition or a bare
/// evaluated expression); word tokens are checked against them before
/// the builtin registry and the namespace (spec §4.F rule 4).
pub fn parse_expression(
    text: &str,
    arg_names: &[String],
    namespace: &mut Namespace,
) -> Result<CodeBlock, EngineError> {
    let mut block = CodeBlock::new();
    block
        .set_arity(arg_names.len() as u8)
        .map_err(|kind| EngineError::new(kind, 0))?;

    let mut tokenizer = Tokenizer::new(text, &registry::PREFIX_TREE, &registry::INFIX_TREE);
    let mut yard = ShuntingYard::new(namespace.eval_on_parse());

    loop {
        let last_was_value = yard.last_token() == LastToken::Value;
        match tokenizer.next(last_was_value) {
            None => break,
            Some(Err(e)) => {
                let pos = e.span().start;
                return Err(EngineError::new(ErrorKind::Token(e), pos));
            }
            Some(Ok(tok)) => {
                let pos = tok.span.start;
                handle_token(tok, &mut tokenizer, &mut yard, &mut block, arg_names, namespace)
                    .map_err(|kind| EngineError::new(kind, pos))?;
            }
        }
    }

    yard.clear(&mut block)
        .map_err(|kind| EngineError::new(kind, tokenizer.position()))?;

    Ok(block)
}

fn handle_token<'a>(
    tok: SpannedToken<'a, &'static Operator>,
    tokenizer: &mut Tokenizer<'a, &'static Operator>,
    yard: &mut ShuntingYard,
    block: &mut CodeBlock,
    arg_names: &[String],
    namespace: &mut Namespace,
) -> Result<(), ErrorKind> {
    match tok.kind {
        TokenKind::LParen => yard.open_parenth(),
        TokenKind::RParen => yard.close_parenth(block, namespace.arena_mut()),
        TokenKind::Comma => yard.put_comma(block),
        TokenKind::Operator(op) => {
            if op.unary {
                yard.put_unary(op)
            } else {
                yard.put_binary(block, op)
            }
        }
        TokenKind::Number { text, is_integer } => {
            let value = Scalar::parse_literal(text, is_integer).ok_or_else(|| {
                ErrorKind::Token(TokenError::InvalidNumber {
                    text: text.to_string(),
                    span: tok.span,
                })
            })?;
            yard.load_const(block, value)
        }
        TokenKind::Word(word) => handle_word(word, tokenizer, yard, block, arg_names, namespace),
    }
}

/// Word resolution order, spec §4.F rule 4: argument name, then builtin
/// (a zero-arity constant loads its value immediately; a function pushes
/// `func_call`), then a namespace variable — forward-declaring it if
/// this is the first time it's been seen — resolved to either a call or
/// a plain value load by peeking for a following `(`.
fn handle_word<'a>(
    word: &'a str,
    tokenizer: &mut Tokenizer<'a, &'static Operator>,
    yard: &mut ShuntingYard,
    block: &mut CodeBlock,
    arg_names: &[String],
    namespace: &mut Namespace,
) -> Result<(), ErrorKind> {
    if let Some(index) = arg_names.iter().position(|a| a == word) {
        return yard.load_arg(block, index as u16);
    }

    if let Some(named) = registry::lookup_named(word) {
        if named.arity == 0 {
            let value = (named.func)(&[])?;
            return yard.load_const(block, value);
        }
        return yard.func_call(named.arity, named.func);
    }

    let callee: BlockRef = {
        let vref = namespace.get_or_create(word);
        namespace.variable(vref).block()
    };
    if tokenizer.peek_is_open_paren() {
        yard.code_call(callee)
    } else {
        yard.load_var(block, callee, namespace.arena_mut())
    }
}
