//! Error taxonomy shared by the maps and their cursors.

/// Errors reported by map constructors, fallible key operations and cursors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MapError {
    /// Malformed constructor or configuration argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A key component was absent; `position` is 0-based.
    #[error("key component {position} is absent")]
    InvalidKey { position: usize },

    /// Cursor accessor or mutator called with no current entry.
    #[error("cursor is not positioned on an entry")]
    InvalidIteratorState,

    /// The map was structurally modified behind the cursor's back.
    #[error("map modified during traversal (expected generation {expected}, found {found})")]
    ConcurrentModification { expected: u64, found: u64 },

    /// Cursor used with a map other than the one that created it.
    #[error("cursor belongs to a different map")]
    WrongMap,
}

/// Result alias for map operations.
pub type Result<T> = std::result::Result<T, MapError>;
