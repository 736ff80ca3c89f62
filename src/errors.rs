/*!
 * Error types for the wordlink dictionary store.
 *
 * The storage layer reports failures through a single typed taxonomy so that
 * callers can map them to transport-level status codes without string
 * matching. Uniqueness and foreign-key violations are classified by
 * inspecting the SQLite extended error code after the statement fails,
 * never by pre-checking.
 */

use thiserror::Error;

use crate::database::models::EntityKind;

/// Result alias used throughout the storage layer
pub type StoreResult<T> = Result<T, DictionaryError>;

/// Errors surfaced by the dictionary storage layer
#[derive(Error, Debug)]
pub enum DictionaryError {
    /// No row of the given kind has the requested id
    #[error("{0} not found")]
    NotFound(EntityKind),

    /// A uniqueness constraint rejected the write
    #[error("{0} with this text already exists")]
    AlreadyExists(EntityKind),

    /// An example attach referenced a translation id with no row behind it
    #[error("translation not found for example")]
    TranslationNotFound,

    /// A contended upsert exhausted its retry budget
    #[error("operation gave up after repeated uniqueness conflicts")]
    ContentionExceeded,

    /// The backing store rejected the operation for any other reason
    #[error("store error: {0}")]
    Store(#[from] rusqlite::Error),

    /// The store handle itself is unusable (poisoned lock, dead task)
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
}

impl DictionaryError {
    /// Whether this error is a uniqueness race that another writer won
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, DictionaryError::Store(err) if is_unique_violation(err))
    }
}

/// Whether a rusqlite error is a UNIQUE constraint violation
pub fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(inner, _)
            if inner.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

/// Whether a rusqlite error is a FOREIGN KEY constraint violation
pub fn is_foreign_key_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(inner, _)
            if inner.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY
    )
}
