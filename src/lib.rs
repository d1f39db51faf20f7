//! # emx-extract
//!
//! Extracts named files embedded in a single block of text, typically an LLM
//! chat transcript that mixes prose and code.
//!
//! ## Recognized Formats
//!
//! Delimited blocks, where the end marker repeats the start marker's name:
//!
//! ```text
//! ========== File Start: src/app.js ==========
//! console.log(1);
//! ========== File End: src/app.js ==========
//! ```
//!
//! Simple blocks:
//!
//! ```text
//! File: style.css
//! body {}
//! ---
//! ```
//!
//! Markdown fences, named by their info string when it looks like a path
//! (`src/lib.rs`, `main.py`) and `file-<k>.<lang>` otherwise.
//!
//! ## Passes
//!
//! The formats are tried in that order, each pass over the text left behind by
//! the previous one. Blocks claimed by an earlier pass are removed first, so a
//! fence quoted inside a delimited block stays part of that block.
//!
//! ## Metadata
//!
//! Every unit gets an `id` (sanitized name plus a random suffix), an
//! `extension`, a `size` under the configured [`SizePolicy`] and a line count.
//!
//! Units can be bundled into a txtar archive with [`Bundle`] and [`Encoder`].

pub mod bundle;
pub mod encoder;
pub mod extractor;
pub mod unit;

pub use bundle::{Bundle, BundleEntry, EncodingConfig, EntryEncoding};
pub use encoder::Encoder;
pub use extractor::{extract, segment, ExtractConfig, Extractor, Segment};
pub use unit::{ExtractedUnit, SizePolicy};
