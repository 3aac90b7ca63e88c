//! Structural, semantic, and evaluation error codes.
//!
//! Modeled on `subset_julia_vm`'s `error/syntax.rs`: a hand-written enum
//! with a manual `Display` rather than a derive macro, because these
//! values cross the C ABI (spec: "integer values form part of the ABI")
//! and need a stable, explicit `strerror` mapping rather than whatever
//! text a derive happens to produce. Token-level failures from
//! `expr_engine_parser` are wrapped rather than duplicated.

use std::fmt;

use expr_engine_parser::TokenError;

/// Every error the engine can report, plus the byte position the parser
/// had reached when it gave up (spec §4.F: "returns the position at which
/// it gave up").
#[derive(Debug, Clone, PartialEq)]
pub struct EngineError {
    pub kind: ErrorKind,
    pub position: usize,
}

impl EngineError {
    pub fn new(kind: ErrorKind, position: usize) -> Self {
        Self { kind, position }
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (at byte {})", self.kind.strerror(), self.position)
    }
}

impl std::error::Error for EngineError {}

/// The sum-type counterpart of spec §6's integer error codes.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorKind {
    ParenthMismatch,
    LowPrecUnary,
    ArityMismatch,
    BadComma,
    FuncNoCall,
    MissingValues,
    MissingOpers,
    ExtraContent,
    Redef,
    CircularDependency,
    IncompleteCode,
    MissingArgs,
    UnknownInstr,
    StackSurplus,
    StackUnderflow,
    Token(TokenError),
}

impl ErrorKind {
    /// Human-readable description, the Rust-side counterpart of the ABI's
    /// `strerror(code)`.
    pub fn strerror(&self) -> &str {
        self.strerror_static()
    }

    /// The stable integer form that crosses the C ABI (spec §6: "integer
    /// values form part of the ABI"). 0 is reserved for "no error" on the
    /// FFI side, so these start at 1 and must never be renumbered.
    pub fn code(&self) -> i32 {
        match self {
            ErrorKind::ParenthMismatch => 1,
            ErrorKind::LowPrecUnary => 2,
            ErrorKind::ArityMismatch => 3,
            ErrorKind::BadComma => 4,
            ErrorKind::FuncNoCall => 5,
            ErrorKind::MissingValues => 6,
            ErrorKind::MissingOpers => 7,
            ErrorKind::ExtraContent => 8,
            ErrorKind::Redef => 9,
            ErrorKind::CircularDependency => 10,
            ErrorKind::IncompleteCode => 11,
            ErrorKind::MissingArgs => 12,
            ErrorKind::UnknownInstr => 13,
            ErrorKind::StackSurplus => 14,
            ErrorKind::StackUnderflow => 15,
            ErrorKind::Token(_) => 16,
        }
    }

    /// `strerror(code)` (spec §6), for codes this process itself produced
    /// via [`ErrorKind::code`]. Unknown codes get a generic message
    /// rather than a panic, since a stale caller-side constant is a
    /// plausible ABI misuse, not a programming error on this side.
    pub fn strerror_for_code(code: i32) -> &'static str {
        match code {
            1 => ErrorKind::ParenthMismatch.strerror_static(),
            2 => ErrorKind::LowPrecUnary.strerror_static(),
            3 => ErrorKind::ArityMismatch.strerror_static(),
            4 => ErrorKind::BadComma.strerror_static(),
            5 => ErrorKind::FuncNoCall.strerror_static(),
            6 => ErrorKind::MissingValues.strerror_static(),
            7 => ErrorKind::MissingOpers.strerror_static(),
            8 => ErrorKind::ExtraContent.strerror_static(),
            9 => ErrorKind::Redef.strerror_static(),
            10 => ErrorKind::CircularDependency.strerror_static(),
            11 => ErrorKind::IncompleteCode.strerror_static(),
            12 => ErrorKind::MissingArgs.strerror_static(),
            13 => ErrorKind::UnknownInstr.strerror_static(),
            14 => ErrorKind::StackSurplus.strerror_static(),
            15 => ErrorKind::StackUnderflow.strerror_static(),
            16 => "malformed token",
            0 => "no error",
            _ => "unrecognized error code",
        }
    }

    /// The single source of truth for every variant's message, as
    /// `'static str` rather than borrowed from `&self` — [`Self::strerror`]
    /// forwards here for a live value, [`Self::strerror_for_code`] calls it
    /// on a fresh temporary built from a bare integer.
    fn strerror_static(&self) -> &'static str {
        match self {
            ErrorKind::ParenthMismatch => "mismatched parentheses",
            ErrorKind::LowPrecUnary => "unary operator applied at too low a precedence",
            ErrorKind::ArityMismatch => "arity disagrees with a prior forward declaration",
            ErrorKind::BadComma => "comma outside of a call argument list",
            ErrorKind::FuncNoCall => "function name used without a following call",
            ErrorKind::MissingValues => "missing value operand",
            ErrorKind::MissingOpers => "missing operator between values",
            ErrorKind::ExtraContent => "trailing content after a complete expression",
            ErrorKind::Redef => "redefinition of an already-implemented name",
            ErrorKind::CircularDependency => "circular dependency between definitions",
            ErrorKind::IncompleteCode => "code block is not in a runnable state",
            ErrorKind::MissingArgs => "callee arity exceeds the available arguments",
            ErrorKind::UnknownInstr => "unrecognized instruction",
            ErrorKind::StackSurplus => "evaluation left more than one value on the stack",
            ErrorKind::StackUnderflow => "evaluation popped more values than were available",
            ErrorKind::Token(_) => "malformed token",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.strerror())
    }
}

impl From<TokenError> for ErrorKind {
    fn from(e: TokenError) -> Self {
        ErrorKind::Token(e)
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
