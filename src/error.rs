use std::io;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Failed to {action} {}: {source}", path.display())]
    Filesystem {
        action: FsAction,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Index file {} is unusable: {reason}", path.display())]
    IndexCorruption { path: PathBuf, reason: String },

    #[error("No snippet with id {0}")]
    NotFound(u64),

    #[error("Invalid config file {}: {reason}", path.display())]
    Config { path: PathBuf, reason: String },
}

/// Input problems caught before anything touches the disk
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Snippet title cannot be empty")]
    EmptyTitle,
    #[error("Snippet code cannot be empty")]
    EmptyCode,
    #[error("Unknown language: {0}")]
    UnknownLanguage(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsAction {
    Read,
    Write,
    Remove,
    CreateDir,
}

impl std::fmt::Display for FsAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let verb = match self {
            FsAction::Read => "read",
            FsAction::Write => "write",
            FsAction::Remove => "remove",
            FsAction::CreateDir => "create directory",
        };
        f.write_str(verb)
    }
}

impl Error {
    pub(crate) fn fs(action: FsAction, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Filesystem {
            action,
            path: path.into(),
            source,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}
