//! codeshelf - a file-backed code snippet library
//!
//! Snippets are saved as real source files, one directory per language, next
//! to a JSON index holding each file's title, tags, preview and creation time.
//! [`SnippetStore`] keeps the two in step across create, rename, update and
//! delete, and [`classify`] derives tags from the code itself.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;

pub use config::Config;
pub use error::{Error, FsAction, Result, ValidationError};
pub use models::{Language, Snippet, SnippetIndex, SnippetStore, classify, sanitize};
