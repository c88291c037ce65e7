#[derive(Debug, thiserror::Error)]
pub enum FriendLibraryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Library source error: {0}")]
    Source(String),

    #[error("A library manager is already registered")]
    AlreadyRegistered,

    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, FriendLibraryError>;

/// Builds a source error for a library list that could not be enumerated.
pub fn source_error(what: &str, detail: impl std::fmt::Display) -> FriendLibraryError {
    FriendLibraryError::Source(format!("failed to enumerate {what}: {detail}"))
}
