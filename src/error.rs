//! Error taxonomy. One enum, never swallowed, never wrapped away.

/// Stable machine-readable error kind, alongside the human-readable
/// `thiserror` message each variant already carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NodeNotFound,
    RelationshipNotFound,
    PermissionDenied,
    Validation,
    ConcurrentModification,
    Backend,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("node not found: {0}")]
    NodeNotFound(String),

    #[error("relationship not found: {from}-[{rel_type}]->{to}")]
    RelationshipNotFound {
        from: String,
        to: String,
        rel_type: String,
    },

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("concurrent modification: expected version {expected}, found {found}")]
    ConcurrentModification { expected: u64, found: u64 },

    #[error("backend error: {0}")]
    Backend(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NodeNotFound(_) => ErrorKind::NodeNotFound,
            Error::RelationshipNotFound { .. } => ErrorKind::RelationshipNotFound,
            Error::PermissionDenied(_) => ErrorKind::PermissionDenied,
            Error::Validation(_) => ErrorKind::Validation,
            Error::ConcurrentModification { .. } => ErrorKind::ConcurrentModification,
            Error::Backend(_) | Error::Io(_) | Error::Codec(_) => ErrorKind::Backend,
        }
    }
}

impl From<object_store::Error> for Error {
    fn from(e: object_store::Error) -> Self {
        Error::Backend(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
