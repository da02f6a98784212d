//! Pipeline stages for exporting a summary of findings.
//!
//! Each submodule implements exactly one step, so each can be tested on its
//! own and swapped without touching the others.
//!
//! ## Data Flow
//!
//! ```text
//! fetch ──▶ fixup ──▶ render
//! (CIP-API)  (DOM)    (wkhtmltopdf)
//! ```
//!
//! 1. [`fetch`]: resolve the interpretation request to one clinical report
//!    and download its HTML
//! 2. [`fixup`]: five attribute-level DOM edits that make the report print
//!    cleanly
//! 3. [`render`]: stream the HTML through `wkhtmltopdf` into the output PDF

pub mod fetch;
pub mod fixup;
pub mod render;
