//! Builtin registry: named operators, functions, and constants
//! (component E), plus the lazily-built prefix/infix operator trees
//! (component B) that the tokenizer matches against.
//!
//! Built once per process via `once_cell::sync::Lazy`, the way
//! `subset_julia_vm` keeps its own base/stdlib tables behind `once_cell`
//! statics rather than re-deriving them per parse. Design Note §9: "Build
//! both operator tries once, at registry load, not lazily on first parse"
//! — satisfied here because `Lazy` still only runs its initializer once,
//! on first touch, and every parse afterwards reuses the same tables.

use once_cell::sync::Lazy;

use expr_engine_parser::PrefixTree;

use crate::error::ErrorKind;
use crate::scalar::Scalar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assoc {
    Left,
    Right,
}

/// A symbolic operator: either prefix (unary) or infix (binary).
pub struct Operator {
    pub symbol: &'static str,
    pub prec: u8,
    pub assoc: Assoc,
    pub unary: bool,
    pub func: fn(&[Scalar]) -> Result<Scalar, ErrorKind>,
}

/// A named function or (arity 0) constant.
pub struct Named {
    pub name: &'static str,
    pub arity: u8,
    pub func: fn(&[Scalar]) -> Result<Scalar, ErrorKind>,
}

impl std::fmt::Debug for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Operator")
            .field("symbol", &self.symbol)
            .field("prec", &self.prec)
            .field("assoc", &self.assoc)
            .field("unary", &self.unary)
            .finish()
    }
}

impl std::fmt::Debug for Named {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Named")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish()
    }
}

fn unary_minus(args: &[Scalar]) -> Result<Scalar, ErrorKind> {
    Ok(args[0].negate())
}
fn binary_add(args: &[Scalar]) -> Result<Scalar, ErrorKind> {
    Ok(args[0].add(args[1]))
}
fn binary_sub(args: &[Scalar]) -> Result<Scalar, ErrorKind> {
    Ok(args[0].sub(args[1]))
}
fn binary_mul(args: &[Scalar]) -> Result<Scalar, ErrorKind> {
    Ok(args[0].mul(args[1]))
}
fn binary_div(args: &[Scalar]) -> Result<Scalar, ErrorKind> {
    Ok(args[0].div(args[1]))
}
fn binary_floor_div(args: &[Scalar]) -> Result<Scalar, ErrorKind> {
    Ok(args[0].floor_div(args[1]))
}
fn binary_mod(args: &[Scalar]) -> Result<Scalar, ErrorKind> {
    Ok(args[0].modulo(args[1]))
}
fn binary_pow(args: &[Scalar]) -> Result<Scalar, ErrorKind> {
    Ok(args[0].pow(args[1]))
}

fn fn_abs(args: &[Scalar]) -> Result<Scalar, ErrorKind> {
    Ok(args[0].abs())
}
fn fn_floor(args: &[Scalar]) -> Result<Scalar, ErrorKind> {
    Ok(args[0].floor())
}
fn fn_ceil(args: &[Scalar]) -> Result<Scalar, ErrorKind> {
    Ok(args[0].ceil())
}
fn fn_sqrt(args: &[Scalar]) -> Result<Scalar, ErrorKind> {
    Ok(args[0].sqrt())
}
fn fn_log(args: &[Scalar]) -> Result<Scalar, ErrorKind> {
    Ok(args[0].log(args[1]))
}
fn fn_ln(args: &[Scalar]) -> Result<Scalar, ErrorKind> {
    Ok(args[0].ln())
}
fn fn_sin(args: &[Scalar]) -> Result<Scalar, ErrorKind> {
    Ok(args[0].sin())
}
fn fn_cos(args: &[Scalar]) -> Result<Scalar, ErrorKind> {
    Ok(args[0].cos())
}
fn fn_tan(args: &[Scalar]) -> Result<Scalar, ErrorKind> {
    Ok(args[0].tan())
}
fn const_pi(_args: &[Scalar]) -> Result<Scalar, ErrorKind> {
    Ok(Scalar::pi())
}
fn const_e(_args: &[Scalar]) -> Result<Scalar, ErrorKind> {
    Ok(Scalar::e())
}

/// Prefix-position (unary) operators, spec §4.E.
pub static PREFIX_OPERATORS: &[Operator] = &[Operator {
    symbol: "-",
    prec: 100,
    assoc: Assoc::Left,
    unary: true,
    func: unary_minus,
}];

/// Infix-position (binary) operators, spec §4.E.
pub static INFIX_OPERATORS: &[Operator] = &[
    Operator {
        symbol: "+",
        prec: 64,
        assoc: Assoc::Left,
        unary: false,
        func: binary_add,
    },
    Operator {
        symbol: "-",
        prec: 64,
        assoc: Assoc::Left,
        unary: false,
        func: binary_sub,
    },
    Operator {
        symbol: "*",
        prec: 96,
        assoc: Assoc::Left,
        unary: false,
        func: binary_mul,
    },
    Operator {
        symbol: "//",
        prec: 96,
        assoc: Assoc::Left,
        unary: false,
        func: binary_floor_div,
    },
    Operator {
        symbol: "/",
        prec: 96,
        assoc: Assoc::Left,
        unary: false,
        func: binary_div,
    },
    Operator {
        symbol: "%",
        prec: 96,
        assoc: Assoc::Left,
        unary: false,
        func: binary_mod,
    },
    Operator {
        symbol: "^",
        prec: 112,
        assoc: Assoc::Right,
        unary: false,
        func: binary_pow,
    },
];

pub static NAMED: &[Named] = &[
    Named {
        name: "abs",
        arity: 1,
        func: fn_abs,
    },
    Named {
        name: "floor",
        arity: 1,
        func: fn_floor,
    },
    Named {
        name: "ceil",
        arity: 1,
        func: fn_ceil,
    },
    Named {
        name: "sqrt",
        arity: 1,
        func: fn_sqrt,
    },
    Named {
        name: "log",
        arity: 2,
        func: fn_log,
    },
    Named {
        name: "ln",
        arity: 1,
        func: fn_ln,
    },
    Named {
        name: "sin",
        arity: 1,
        func: fn_sin,
    },
    Named {
        name: "cos",
        arity: 1,
        func: fn_cos,
    },
    Named {
        name: "tan",
        arity: 1,
        func: fn_tan,
    },
    Named {
        name: "pi",
        arity: 0,
        func: const_pi,
    },
    Named {
        name: "e",
        arity: 0,
        func: const_e,
    },
];

pub fn lookup_named(name: &str) -> Option<&'static Named> {
    NAMED.iter().find(|n| n.name == name)
}

/// Lazily-built longest-prefix matchers over [`PREFIX_OPERATORS`] and
/// [`INFIX_OPERATORS`], keyed on the operator's symbol text. The
/// tokenizer is handed these two trees and a `last_was_value` flag
/// selects between them (spec §4.F rule 2).
pub static PREFIX_TREE: Lazy<PrefixTree<&'static Operator>> = Lazy::new(|| {
    PrefixTree::from_entries(PREFIX_OPERATORS.iter().map(|op| (op.symbol, op)))
});

pub static INFIX_TREE: Lazy<PrefixTree<&'static Operator>> = Lazy::new(|| {
    PrefixTree::from_entries(INFIX_OPERATORS.iter().map(|op| (op.symbol, op)))
});
