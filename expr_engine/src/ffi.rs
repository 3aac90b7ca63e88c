//! C ABI surface for the document slicer (spec §6): opaque `Namespace`
//! handle, heap-allocated result strings, and integer error codes.
//!
//! Modeled on `subset_julia_vm`'s `ffi/repl_ffi.rs`: an opaque pointer
//! created/freed in pairs (`Box::into_raw`/`Box::from_raw`), strings
//! crossing the boundary as owned `CString`s freed by a single shared
//! `expr_engine_free_string`, and every entry point null-checking its
//! pointer arguments instead of trusting the caller.

// FFI functions intentionally take raw pointers and are called from
// whatever language hosts the document slicer. The caller is responsible
// for pointer validity.
#![allow(clippy::not_unsafe_ptr_arg_deref)]

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use crate::error::ErrorKind;
use crate::namespace::{Namespace, VarRef};

/// `namespace_new(eval_on_parse: bool) -> Namespace` (spec §6).
#[no_mangle]
pub extern "C" fn expr_engine_namespace_new(eval_on_parse: bool) -> *mut Namespace {
    Box::into_raw(Box::new(Namespace::new(eval_on_parse)))
}

/// `namespace_free(Namespace)` (spec §6).
#[no_mangle]
pub extern "C" fn expr_engine_namespace_free(ns: *mut Namespace) {
    if !ns.is_null() {
        unsafe {
            drop(Box::from_raw(ns));
        }
    }
}

/// Free a string returned by any `expr_engine_*` function below.
#[no_mangle]
pub extern "C" fn expr_engine_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        unsafe {
            drop(CString::from_raw(ptr));
        }
    }
}

fn cstring_or_null(s: String) -> *mut c_char {
    CString::new(s).map(|s| s.into_raw()).unwrap_or(std::ptr::null_mut())
}

/// `define(ns, text) -> (parsed_len, var_ref?, error?)` (spec §6).
///
/// Returns the byte offset the parser reached (the whole of `text` on
/// success, the position it gave up at on failure). `var_ref_out` is
/// written only on success; `error_out` is written 0 on success or a
/// [`ErrorKind::code`] on failure. Either out-pointer may be null if the
/// caller doesn't need it.
#[no_mangle]
pub extern "C" fn expr_engine_define(
    ns: *mut Namespace,
    text: *const c_char,
    var_ref_out: *mut u64,
    error_out: *mut i32,
) -> i64 {
    if ns.is_null() || text.is_null() {
        unsafe {
            if !error_out.is_null() {
                *error_out = ErrorKind::IncompleteCode.code();
            }
        }
        return -1;
    }
    let text = match unsafe { CStr::from_ptr(text) }.to_str() {
        Ok(s) => s,
        Err(_) => {
            unsafe {
                if !error_out.is_null() {
                    *error_out = ErrorKind::Token(expr_engine_parser::TokenError::UnrecognizedInput {
                        span: expr_engine_parser::Span::new(0, 0),
                    })
                    .code();
                }
            }
            return -1;
        }
    };
    let ns = unsafe { &mut *ns };

    match ns.define(text) {
        Ok(vref) => {
            unsafe {
                if !var_ref_out.is_null() {
                    *var_ref_out = vref.0 as u64;
                }
                if !error_out.is_null() {
                    *error_out = 0;
                }
            }
            text.len() as i64
        }
        Err(e) => {
            unsafe {
                if !error_out.is_null() {
                    *error_out = e.kind.code();
                }
            }
            e.position as i64
        }
    }
}

fn resolve(ns: &Namespace, var_ref: u64) -> Option<VarRef> {
    let idx = var_ref as usize;
    if idx < ns.var_count() {
        Some(VarRef(idx))
    } else {
        None
    }
}

/// `var_name(var_ref) -> string` (spec §6). Returns null for an
/// out-of-range handle.
#[no_mangle]
pub extern "C" fn expr_engine_var_name(ns: *mut Namespace, var_ref: u64) -> *mut c_char {
    if ns.is_null() {
        return std::ptr::null_mut();
    }
    let ns = unsafe { &*ns };
    match resolve(ns, var_ref) {
        Some(vref) => cstring_or_null(ns.var_name(vref).to_string()),
        None => std::ptr::null_mut(),
    }
}

/// `var_value(var_ref) -> (scalar, error?)` (spec §6). The scalar is
/// surfaced as its `f64` approximation (spec §4.A's `to_f64`); callers
/// needing the exact rational form should use `var_print` instead.
/// Returns 0 and writes `value_out` on success; returns an
/// [`ErrorKind::code`] and leaves `value_out` untouched otherwise.
#[no_mangle]
pub extern "C" fn expr_engine_var_value(
    ns: *mut Namespace,
    var_ref: u64,
    value_out: *mut f64,
) -> i32 {
    if ns.is_null() {
        return ErrorKind::IncompleteCode.code();
    }
    let ns = unsafe { &mut *ns };
    let vref = match resolve(ns, var_ref) {
        Some(v) => v,
        None => return ErrorKind::IncompleteCode.code(),
    };
    match ns.value(vref) {
        Ok(scalar) => {
            unsafe {
                if !value_out.is_null() {
                    *value_out = scalar.to_f64();
                }
            }
            0
        }
        Err(e) => e.code(),
    }
}

/// `var_print(var_ref, writer)` (spec §6) — returns a heap string of the
/// printed scalar, or `"ERR <code>"` on evaluation failure, matching
/// [`Namespace::var_print`] exactly rather than re-deriving it here.
#[no_mangle]
pub extern "C" fn expr_engine_var_print(ns: *mut Namespace, var_ref: u64) -> *mut c_char {
    if ns.is_null() {
        return std::ptr::null_mut();
    }
    let ns = unsafe { &mut *ns };
    match resolve(ns, var_ref) {
        Some(vref) => cstring_or_null(ns.var_print(vref)),
        None => cstring_or_null(format!("ERR {}", ErrorKind::IncompleteCode.strerror())),
    }
}

/// Copy `s` into the caller-provided `buf` of `buf_len` bytes, truncating
/// to fit and always null-terminating when `buf_len > 0`. Returns the
/// number of bytes copied (excluding the terminator), or -1 if `buf` is
/// null.
fn write_c_buf(s: &str, buf: *mut c_char, buf_len: usize) -> i64 {
    if buf.is_null() || buf_len == 0 {
        return -1;
    }
    let bytes = s.as_bytes();
    let copy_len = bytes.len().min(buf_len - 1);
    unsafe {
        let dst = std::slice::from_raw_parts_mut(buf as *mut u8, buf_len);
        dst[..copy_len].copy_from_slice(&bytes[..copy_len]);
        dst[copy_len] = 0;
    }
    copy_len as i64
}

/// `format_cycle(ns, buf) -> written_len` (spec §6).
#[no_mangle]
pub extern "C" fn expr_engine_format_cycle(
    ns: *mut Namespace,
    buf: *mut c_char,
    buf_len: usize,
) -> i64 {
    if ns.is_null() {
        return -1;
    }
    let ns = unsafe { &*ns };
    write_c_buf(&ns.format_cycle(), buf, buf_len)
}

/// `format_redef(ns, buf) -> written_len` (spec §6).
#[no_mangle]
pub extern "C" fn expr_engine_format_redef(
    ns: *mut Namespace,
    buf: *mut c_char,
    buf_len: usize,
) -> i64 {
    if ns.is_null() {
        return -1;
    }
    let ns = unsafe { &*ns };
    write_c_buf(&ns.format_redef(), buf, buf_len)
}

/// `strerror(code) -> string` (spec §6).
#[no_mangle]
pub extern "C" fn expr_engine_strerror(code: i32) -> *mut c_char {
    cstring_or_null(ErrorKind::strerror_for_code(code).to_string())
}
