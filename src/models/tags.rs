use crate::error::ValidationError;
use crate::models::Language;
use once_cell::sync::Lazy;
use regex::Regex;

static TITLE_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").expect("valid title word regex"));

/// Title words must be longer than this many characters to become tags
const MIN_TITLE_WORD_LEN: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseMode {
    Sensitive,
    Insensitive,
}

/// One entry of the classifier: the tag is added when any pattern occurs in
/// the code as a plain substring.
#[derive(Debug, Clone, Copy)]
pub struct TagRule {
    /// Tag emitted on a match
    pub tag: &'static str,

    /// Substrings looked for in the code
    pub patterns: &'static [&'static str],

    /// Insensitive rules compare against the lowercased code
    pub case: CaseMode,
}

impl TagRule {
    const fn sensitive(tag: &'static str, patterns: &'static [&'static str]) -> Self {
        Self {
            tag,
            patterns,
            case: CaseMode::Sensitive,
        }
    }

    const fn insensitive(tag: &'static str, patterns: &'static [&'static str]) -> Self {
        Self {
            tag,
            patterns,
            case: CaseMode::Insensitive,
        }
    }

    /// `lowered` must be `code.to_lowercase()`; it is passed in so the
    /// lowercase copy is built once per classification.
    pub fn matches(&self, code: &str, lowered: &str) -> bool {
        let haystack = match self.case {
            CaseMode::Sensitive => code,
            CaseMode::Insensitive => lowered,
        };
        self.patterns.iter().any(|p| haystack.contains(p))
    }
}

/// Rules in the order their tags are emitted
pub const TAG_RULES: &[TagRule] = &[
    TagRule::sensitive("function", &["def ", "function "]),
    TagRule::sensitive("class", &["class "]),
    TagRule::sensitive("imports", &["import ", "#include"]),
    TagRule::sensitive("conditional", &["if", "else", "switch"]),
    TagRule::sensitive("loop", &["for", "while", "loop"]),
    TagRule::sensitive("error-handling", &["try", "except", "catch"]),
    TagRule::sensitive("async", &["async", "await", "Promise"]),
    TagRule::insensitive("api", &["api", "fetch", "request"]),
    TagRule::insensitive("file-io", &["file", "open("]),
    TagRule::insensitive("data-processing", &["sort", "filter", "map"]),
];

/// Derives descriptive tags from a snippet's code, title and language.
///
/// Output order: rule tags in [`TAG_RULES`] order, then the lowercased
/// language name, then title words longer than three characters. Duplicates
/// keep their first position.
pub fn classify(code: &str, title: &str, language: Language) -> crate::Result<Vec<String>> {
    if code.trim().is_empty() {
        return Err(ValidationError::EmptyCode.into());
    }

    let lowered = code.to_lowercase();
    let mut tags = Vec::new();

    for rule in TAG_RULES.iter().filter(|rule| rule.matches(code, &lowered)) {
        push_unique(&mut tags, rule.tag.to_string());
    }

    push_unique(&mut tags, language.name().to_lowercase());

    let title = title.to_lowercase();
    for word in TITLE_WORD.find_iter(&title) {
        if word.as_str().chars().count() > MIN_TITLE_WORD_LEN {
            push_unique(&mut tags, word.as_str().to_string());
        }
    }

    Ok(tags)
}

/// Cleans tags typed by a user: trims, drops a leading `#`, lowercases, and
/// removes empties and duplicates.
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = Vec::new();
    for tag in tags {
        let tag = tag.as_ref().trim();
        let tag = tag.strip_prefix('#').unwrap_or(tag).trim().to_lowercase();
        if !tag.is_empty() {
            push_unique(&mut out, tag);
        }
    }
    out
}

/// Appends `extra` to `tags`, skipping anything already present
pub fn merge_tags(tags: &mut Vec<String>, extra: impl IntoIterator<Item = String>) {
    for tag in extra {
        push_unique(tags, tag);
    }
}

fn push_unique(tags: &mut Vec<String>, tag: String) {
    if !tags.contains(&tag) {
        tags.push(tag);
    }
}
