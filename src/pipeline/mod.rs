//! Building blocks shared by the Markdown and notebook pipelines.
//!
//! Each submodule implements one transformation step and is tested on its own.
//!
//! ## Data Flow
//!
//! ```text
//! Markdown:  input ──▶ markdown ──▶ template ──▶ images ──▶ (encode)
//!            (read)    (comrak)     (shell)      (find src)  (base64)
//!
//! Notebook:  exported HTML ──▶ cleanup ──▶ input (atomic write)
//!                              (dom edits)
//! ```
//!
//! 1. [`input`]    — read sources as text/bytes, write outputs atomically
//! 2. [`markdown`] — CommonMark + GFM tables, description lists, footnotes
//! 3. [`template`] — inject content into a shell with one substitution point
//! 4. [`images`]   — collect local `<img src>` values and inline them
//! 5. [`encode`]   — `data:image/<ext>;base64, …` URIs
//! 6. [`dom`]      — html5ever parse/serialise plus small tree helpers
//! 7. [`cleanup`]  — strip notebook chrome from an exported report

pub mod cleanup;
pub mod dom;
pub mod encode;
pub mod images;
pub mod input;
pub mod markdown;
pub mod template;
