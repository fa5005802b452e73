use crate::models::Language;
use chrono::{Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Number of characters of code kept in [`Snippet::code_preview`]
pub const PREVIEW_CHARS: usize = 100;

const PREVIEW_ELLIPSIS: &str = "...";

/// Index record for one saved code file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snippet {
    pub id: u64,
    pub title: String,
    pub language: Language,
    pub filename: String,
    pub filepath: PathBuf,
    pub extension: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub code_preview: String,
    #[serde(with = "created_format")]
    pub created: NaiveDateTime,
}

impl Snippet {
    pub(crate) fn new(
        id: u64,
        title: String,
        language: Language,
        filename: String,
        filepath: PathBuf,
        tags: Vec<String>,
        code: &str,
    ) -> Self {
        Self {
            id,
            title,
            language,
            filename,
            filepath,
            extension: language.extension().to_string(),
            tags,
            code_preview: make_preview(code),
            // Whole seconds, matching what the index stores
            created: now_to_seconds(),
        }
    }

    /// Date part of [`Snippet::created`], as shown on listings
    pub fn created_date(&self) -> String {
        self.created.format("%Y-%m-%d").to_string()
    }

    /// True if the term occurs, ignoring case, in the title, language,
    /// filename or any tag
    pub fn matches(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.title.to_lowercase().contains(&term)
            || self.language.name().to_lowercase().contains(&term)
            || self.filename.to_lowercase().contains(&term)
            || self.tags.iter().any(|tag| tag.to_lowercase().contains(&term))
    }
}

/// First [`PREVIEW_CHARS`] characters of the code, with `...` appended when
/// anything was cut off.
pub fn make_preview(code: &str) -> String {
    match code.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}{}", &code[..cut], PREVIEW_ELLIPSIS),
        None => code.to_string(),
    }
}

fn now_to_seconds() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

mod created_format {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S>(created: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&created.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }
}
