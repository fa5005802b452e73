pub mod filename;
pub mod language;
pub mod snippet;
pub mod storage;
pub mod tags;

pub use filename::sanitize;
pub use language::{Language, extension_for};
pub use snippet::Snippet;
pub use storage::{SnippetIndex, SnippetStore};
pub use tags::{TAG_RULES, TagRule, classify, normalize_tags};
