use crate::config::Config;
use crate::error::{Error, FsAction, Result, ValidationError};
use crate::models::filename::sanitize;
use crate::models::snippet::make_preview;
use crate::models::tags::normalize_tags;
use crate::models::{Language, Snippet};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Current layout of the index document
pub const SCHEMA_VERSION: u32 = 1;

/// Everything the index file holds. Loaded whole and written whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnippetIndex {
    pub schema_version: u32,
    pub snippets: Vec<Snippet>,
}

impl Default for SnippetIndex {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            snippets: Vec::new(),
        }
    }
}

impl SnippetIndex {
    /// Next id to hand out: one past the largest id currently present
    pub fn next_id(&self) -> u64 {
        self.snippets.iter().map(|s| s.id).max().unwrap_or(0) + 1
    }

    pub fn get(&self, id: u64) -> Option<&Snippet> {
        self.snippets.iter().find(|s| s.id == id)
    }

    fn position(&self, id: u64) -> Result<usize> {
        self.snippets
            .iter()
            .position(|s| s.id == id)
            .ok_or(Error::NotFound(id))
    }

    /// Drops records other than `keep` whose file lives at `path`. Called
    /// after a confirmed overwrite so one file never backs two records.
    fn release_path(&mut self, path: &Path, keep: Option<u64>) {
        self.snippets.retain(|s| {
            let superseded = s.filepath == path && Some(s.id) != keep;
            if superseded {
                info!(id = s.id, path = %path.display(), "snippet superseded by overwrite");
            }
            !superseded
        });
    }

    fn parse(content: &str, path: &Path) -> Result<Self> {
        let corrupt = |reason: String| Error::IndexCorruption {
            path: path.to_path_buf(),
            reason,
        };

        let value: serde_json::Value =
            serde_json::from_str(content).map_err(|e| corrupt(e.to_string()))?;

        match value {
            // Older indexes are a bare array of records
            serde_json::Value::Array(_) => {
                let snippets: Vec<Snippet> =
                    serde_json::from_value(value).map_err(|e| corrupt(e.to_string()))?;
                Ok(Self {
                    schema_version: SCHEMA_VERSION,
                    snippets,
                })
            }
            serde_json::Value::Object(_) => {
                let index: SnippetIndex =
                    serde_json::from_value(value).map_err(|e| corrupt(e.to_string()))?;
                if index.schema_version != SCHEMA_VERSION {
                    return Err(corrupt(format!(
                        "unsupported schema version {}",
                        index.schema_version
                    )));
                }
                Ok(index)
            }
            _ => Err(corrupt("expected an array or object".to_string())),
        }
    }
}

/// Keeps the language folders under `base_dir` and the index file in step.
///
/// The store holds no records itself. Every operation reads the index from
/// disk, and every mutation writes it back before returning, so edits made to
/// the index by other tools are picked up on the next call.
#[derive(Debug, Clone)]
pub struct SnippetStore {
    base_dir: PathBuf,
    index_path: PathBuf,
}

impl SnippetStore {
    pub fn open(config: &Config) -> Result<Self> {
        let store = Self {
            base_dir: config.base_dir.clone(),
            index_path: config.index_path(),
        };
        ensure_dir(&store.base_dir)?;
        Ok(store)
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn index_path(&self) -> &Path {
        &self.index_path
    }

    /// Reads the index. A missing file is an empty index.
    pub fn load(&self) -> Result<SnippetIndex> {
        if !self.index_path.exists() {
            debug!(path = %self.index_path.display(), "no index yet");
            return Ok(SnippetIndex::default());
        }

        let content = fs::read_to_string(&self.index_path)
            .map_err(|e| Error::fs(FsAction::Read, &self.index_path, e))?;
        let index = SnippetIndex::parse(&content, &self.index_path)?;
        debug!(count = index.snippets.len(), "loaded index");
        Ok(index)
    }

    /// Writes the whole index through a temp file in `base_dir`, so readers
    /// never see a half-written document.
    pub fn save(&self, index: &SnippetIndex) -> Result<()> {
        let write_err = |e: io::Error| Error::fs(FsAction::Write, &self.index_path, e);

        let content = serde_json::to_string_pretty(index)
            .map_err(|e| write_err(io::Error::other(e)))?;

        ensure_dir(&self.base_dir)?;
        let mut tmp = tempfile::NamedTempFile::new_in(&self.base_dir).map_err(write_err)?;
        tmp.write_all(content.as_bytes()).map_err(write_err)?;
        tmp.flush().map_err(write_err)?;
        tmp.persist(&self.index_path)
            .map_err(|e| write_err(e.error))?;

        debug!(count = index.snippets.len(), "saved index");
        Ok(())
    }

    /// All records in the order they were first saved
    pub fn list(&self) -> Result<Vec<Snippet>> {
        Ok(self.load()?.snippets)
    }

    /// Records whose title, language, filename or tags contain `term`,
    /// ignoring case. A blank term matches everything.
    pub fn search(&self, term: &str) -> Result<Vec<Snippet>> {
        let term = term.trim();
        let snippets = self.load()?.snippets;
        if term.is_empty() {
            return Ok(snippets);
        }
        Ok(snippets.into_iter().filter(|s| s.matches(term)).collect())
    }

    pub fn get(&self, id: u64) -> Result<Snippet> {
        self.load()?.get(id).cloned().ok_or(Error::NotFound(id))
    }

    /// Current file content for a record
    pub fn read_code(&self, snippet: &Snippet) -> Result<String> {
        fs::read_to_string(&snippet.filepath)
            .map_err(|e| Error::fs(FsAction::Read, &snippet.filepath, e))
    }

    /// File name a snippet with this title and language is saved under
    pub fn filename_for(title: &str, language: Language) -> String {
        format!("{}{}", sanitize(title.trim()), language.extension())
    }

    /// Where a snippet with this title and language would be written
    pub fn target_path(&self, title: &str, language: Language) -> PathBuf {
        self.base_dir
            .join(language.name())
            .join(Self::filename_for(title, language))
    }

    /// Whether writing to `path` would replace an existing file. Callers ask
    /// the user before going ahead when this is true.
    pub fn would_overwrite(&self, path: &Path) -> bool {
        path.exists()
    }

    /// Saves a new snippet. The file is written first; the index only gains
    /// the record once the write has succeeded.
    pub fn create(
        &self,
        title: &str,
        language: Language,
        code: &str,
        tags: Vec<String>,
    ) -> Result<Snippet> {
        let title = validate(title, code)?;
        let mut index = self.load()?;

        let filename = Self::filename_for(title, language);
        let filepath = self.language_dir(language)?.join(&filename);
        write_code(&filepath, code)?;

        let id = index.next_id();
        index.release_path(&filepath, None);

        let snippet = Snippet::new(
            id,
            title.to_string(),
            language,
            filename,
            filepath,
            normalize_tags(tags),
            code,
        );
        index.snippets.push(snippet.clone());
        self.save(&index)?;

        info!(id, path = %snippet.filepath.display(), "created snippet");
        Ok(snippet)
    }

    /// Rewrites an existing snippet. When the title or language moves the
    /// file, the new file is written and the index saved before the old file
    /// is removed, so a failure at any step leaves the record backed by a
    /// file. `id` and `created` never change.
    pub fn update(
        &self,
        id: u64,
        title: &str,
        language: Language,
        code: &str,
        tags: Vec<String>,
    ) -> Result<Snippet> {
        let title = validate(title, code)?;
        let mut index = self.load()?;
        let old_path = index.snippets[index.position(id)?].filepath.clone();

        let filename = Self::filename_for(title, language);
        let filepath = self.language_dir(language)?.join(&filename);
        write_code(&filepath, code)?;

        // The stored path may name the new file another way (relative base,
        // symlinked directory, case-insensitive rename)
        let moved = old_path != filepath && !is_same_file(&old_path, &filepath);

        index.release_path(&filepath, Some(id));
        let pos = index.position(id)?;
        let snippet = &mut index.snippets[pos];
        snippet.title = title.to_string();
        snippet.language = language;
        snippet.filename = filename;
        snippet.filepath = filepath;
        snippet.extension = language.extension().to_string();
        snippet.tags = normalize_tags(tags);
        snippet.code_preview = make_preview(code);
        let updated = snippet.clone();

        self.save(&index)?;

        if moved {
            match remove_if_exists(&old_path) {
                Ok(_) => debug!(id, old = %old_path.display(), "removed previous file"),
                // The index already points at the new file; the old one is
                // left behind as an orphan.
                Err(e) => warn!(
                    id,
                    old = %old_path.display(),
                    error = %e,
                    "could not remove previous file"
                ),
            }
        }

        info!(id, path = %updated.filepath.display(), "updated snippet");
        Ok(updated)
    }

    /// Removes a snippet's file and its record. A file that is already gone
    /// is fine; any other removal failure leaves the index untouched.
    pub fn delete(&self, id: u64) -> Result<Snippet> {
        let mut index = self.load()?;
        let pos = index.position(id)?;

        let path = index.snippets[pos].filepath.clone();
        if !remove_if_exists(&path).map_err(|e| Error::fs(FsAction::Remove, &path, e))? {
            debug!(id, path = %path.display(), "file already missing");
        }

        let removed = index.snippets.remove(pos);
        self.save(&index)?;

        info!(id, path = %path.display(), "deleted snippet");
        Ok(removed)
    }

    fn language_dir(&self, language: Language) -> Result<PathBuf> {
        let dir = self.base_dir.join(language.name());
        ensure_dir(&dir)?;
        Ok(dir)
    }
}

/// Checks the inputs shared by create and update; returns the trimmed title
fn validate<'a>(title: &'a str, code: &str) -> Result<&'a str> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ValidationError::EmptyTitle.into());
    }
    if code.trim().is_empty() {
        return Err(ValidationError::EmptyCode.into());
    }
    Ok(title)
}

fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| Error::fs(FsAction::CreateDir, dir, e))
}

fn write_code(path: &Path, code: &str) -> Result<()> {
    fs::write(path, code).map_err(|e| Error::fs(FsAction::Write, path, e))
}

/// True when both paths resolve to one existing file. A missing path is
/// never the same file as anything.
#[cfg(unix)]
fn is_same_file(a: &Path, b: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;
    match (fs::metadata(a), fs::metadata(b)) {
        (Ok(a), Ok(b)) => a.dev() == b.dev() && a.ino() == b.ino(),
        _ => false,
    }
}

#[cfg(not(unix))]
fn is_same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// `Ok(false)` when there was nothing to remove
fn remove_if_exists(path: &Path) -> io::Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}
