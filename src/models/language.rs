use crate::error::{Error, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Languages a snippet can be filed under. Each one gets its own directory
/// below the store's base directory, named after [`Language::name`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    Python,
    JavaScript,
    Java,
    #[serde(rename = "C++")]
    Cpp,
    #[serde(rename = "HTML")]
    Html,
    #[serde(rename = "CSS")]
    Css,
    #[serde(rename = "SQL")]
    Sql,
    Ruby,
    Go,
    Rust,
    TypeScript,
    #[serde(rename = "PHP")]
    Php,
    C,
    #[serde(rename = "C#")]
    CSharp,
    Swift,
    Kotlin,
    Other,
}

impl Language {
    /// Catalog order, as offered by a language picker
    pub const ALL: [Language; 17] = [
        Language::Python,
        Language::JavaScript,
        Language::Java,
        Language::Cpp,
        Language::Html,
        Language::Css,
        Language::Sql,
        Language::Ruby,
        Language::Go,
        Language::Rust,
        Language::TypeScript,
        Language::Php,
        Language::C,
        Language::CSharp,
        Language::Swift,
        Language::Kotlin,
        Language::Other,
    ];

    /// File extension for the language, including the leading dot
    pub fn extension(&self) -> &'static str {
        match self {
            Language::Python => ".py",
            Language::JavaScript => ".js",
            Language::Java => ".java",
            Language::Cpp => ".cpp",
            Language::Html => ".html",
            Language::Css => ".css",
            Language::Sql => ".sql",
            Language::Ruby => ".rb",
            Language::Go => ".go",
            Language::Rust => ".rs",
            Language::TypeScript => ".ts",
            Language::Php => ".php",
            Language::C => ".c",
            Language::CSharp => ".cs",
            Language::Swift => ".swift",
            Language::Kotlin => ".kt",
            Language::Other => ".txt",
        }
    }

    /// Display name. Doubles as the directory name on disk.
    pub fn name(&self) -> &'static str {
        match self {
            Language::Python => "Python",
            Language::JavaScript => "JavaScript",
            Language::Java => "Java",
            Language::Cpp => "C++",
            Language::Html => "HTML",
            Language::Css => "CSS",
            Language::Sql => "SQL",
            Language::Ruby => "Ruby",
            Language::Go => "Go",
            Language::Rust => "Rust",
            Language::TypeScript => "TypeScript",
            Language::Php => "PHP",
            Language::C => "C",
            Language::CSharp => "C#",
            Language::Swift => "Swift",
            Language::Kotlin => "Kotlin",
            Language::Other => "Other",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Language::ALL
            .iter()
            .find(|lang| lang.name() == wanted)
            .or_else(|| {
                Language::ALL
                    .iter()
                    .find(|lang| lang.name().eq_ignore_ascii_case(wanted))
            })
            .copied()
            .ok_or_else(|| ValidationError::UnknownLanguage(s.to_string()).into())
    }
}

/// Extension lookup by language name. Unknown names are a validation error.
pub fn extension_for(language: &str) -> crate::Result<&'static str> {
    Ok(language.parse::<Language>()?.extension())
}
