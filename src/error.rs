//! Unified error type for all store operations.

use thiserror::Error;

/// Things that can go wrong when using the store.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// No record in `collection` has an id matching `id`.
    #[error("{collection} record not found: {id}")]
    NotFound {
        /// Collection that was scanned.
        collection: &'static str,
        /// Id as supplied by the caller.
        id: String,
    },
    /// Registration with an email that is already taken.
    #[error("user already exists: {email}")]
    Conflict {
        /// The duplicate email.
        email: String,
    },
    /// Email/password pair matches no user.
    #[error("invalid credentials")]
    Unauthorized,
    /// Writing the document to disk failed. The in-memory document already
    /// holds the mutation.
    #[error("failed to persist document: {0}")]
    Persistence(String),
    /// The backing file could not be read or parsed.
    #[error("failed to load document: {0}")]
    Load(String),
    /// Failed to serialize the document to bytes.
    #[error("serialization error: {0}")]
    Serialize(String),
    /// Password hashing or token signing/verification failed.
    #[error("credential error: {0}")]
    Credential(String),
    /// Bad configuration (empty path, zero ttl, etc.).
    #[error("config error: {0}")]
    Config(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Persistence(err.to_string())
    }
}

/// Decoding failures. Encoding errors are mapped to [`Error::Serialize`] at
/// the call site since serde_json reports them in the same categories.
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        if err.is_io() {
            Error::Persistence(err.to_string())
        } else {
            Error::Load(err.to_string())
        }
    }
}

/// Result alias using our [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;
