//! Error taxonomy for the catalog engine
//!
//! Validation and lookup errors are reported synchronously and never retried.
//! Persistence errors are fatal for the operation that raised them; in-memory
//! state is never updated before the write they guard has succeeded.
use thiserror::Error;

/// Result alias used across the crate
pub type CatalogResult<T> = Result<T, CatalogError>;

#[derive(Debug, Error)]
pub enum CatalogError {
    // ========== Validation ==========
    #[error("invalid tag: {0}")]
    InvalidTag(String),

    #[error("invalid date '{0}'")]
    InvalidDate(String),

    #[error("invalid range: start {start} is after end {end}")]
    InvalidRange { start: String, end: String },

    #[error("invalid arity for tag type '{0}': limit must be at least 1")]
    InvalidArity(String),

    #[error("invalid username '{0}'")]
    InvalidUsername(String),

    #[error("search query needs at least one tag")]
    EmptyQuery,

    // ========== Lookup / uniqueness ==========
    #[error("an album named '{0}' already exists")]
    DuplicateAlbumName(String),

    #[error("album '{0}' not found")]
    AlbumNotFound(String),

    #[error("photo '{0}' not found")]
    PhotoNotFound(String),

    #[error("a photo with path '{0}' is already in the catalog")]
    DuplicatePhoto(String),

    #[error("user '{0}' already exists")]
    DuplicateUser(String),

    #[error("user '{0}' not found")]
    UserNotFound(String),

    #[error("account '{0}' is protected and cannot be deleted")]
    ProtectedAccount(String),

    #[error("'{username}' is not allowed to manage accounts")]
    PermissionDenied { username: String },

    #[error("tag type '{type_name}' allows at most {limit} value(s) per photo")]
    TagArityExceeded { type_name: String, limit: u32 },

    // ========== Persistence ==========
    #[error("stored catalog for '{username}' is corrupt: {reason}")]
    CorruptData { username: String, reason: String },

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("failed to serialize catalog: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl CatalogError {
    pub(crate) fn corrupt(username: &str, reason: impl Into<String>) -> Self {
        CatalogError::CorruptData {
            username: username.to_string(),
            reason: reason.into(),
        }
    }
}
