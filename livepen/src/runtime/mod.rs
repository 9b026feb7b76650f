//! Generates the self-contained preview document that runs user code inside
//! an isolated frame.
//!
//! This module is split into:
//! - `document`: the assembler (sanitized markup, styles, shim, wrapped script)
//! - `shim`: the interception/error-forwarding script installed in `<head>`
//! - `helpers`: escaping shared by both

mod document;
pub(crate) mod helpers;
mod shim;

pub use document::{assemble, assemble_with, AssembledDocument};
pub use shim::{shim_js, NOTICE_ELEMENT_ID, REPORT_FN};
