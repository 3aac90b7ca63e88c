//! Pratt/Shunting-Yard expression engine: bytecode, rational/real
//! arithmetic, and a namespace of mutually-dependent named variables and
//! functions.
//!
//! This crate is the core the document slicer (out of scope here) sits
//! on top of: it owns parsing, evaluation, and the namespace; it never
//! touches the surrounding document text, command-line handling, or
//! editor integration.

#![deny(clippy::print_stderr)]

pub mod bytecode;
pub mod error;
pub mod ffi;
pub mod namespace;
pub mod parser;
pub mod registry;
pub mod scalar;
pub mod yard;

pub use bytecode::BlockRef;
pub use error::{EngineError, EngineResult, ErrorKind};
pub use namespace::{Namespace, VarRef, Variable};
pub use scalar::Scalar;

pub use ffi::{
    expr_engine_define, expr_engine_format_cycle, expr_engine_format_redef,
    expr_engine_free_string, expr_engine_namespace_free, expr_engine_namespace_new,
    expr_engine_strerror, expr_engine_var_name, expr_engine_var_print, expr_engine_var_value,
};
