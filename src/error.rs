use std::path::PathBuf;

/// Failure writing the board file.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("could not serialize board: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("could not write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Rejected form submission.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("Please enter a title")]
    EmptyTitle,
    #[error("no task with id {0}")]
    UnknownTask(String),
}

/// Top-level error for the binary.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Form(#[from] FormError),
    #[error("no task with id {0}")]
    UnknownTask(String),
    #[error("{0}")]
    Usage(String),
    #[error("terminal error: {0}")]
    Io(#[from] std::io::Error),
}
