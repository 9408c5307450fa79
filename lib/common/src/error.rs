pub use rdf_working_set_model::InvalidNodeKindError;
use std::io;

/// A result of a fallible store operation.
pub type StoreResult<T> = Result<T, StoreError>;

/// An error raised by a mutating operation of the store.
///
/// Absence (e.g., an unknown entity) is never an error. All variants indicate a misuse of the
/// store by the owning session and are not meant to be retried.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum StoreError {
    /// An operation received a node of the wrong kind.
    #[error(transparent)]
    InvalidNodeKind(#[from] InvalidNodeKindError),
    /// The store is not in a state that permits the operation.
    #[error(transparent)]
    State(#[from] StateError),
}

impl From<StoreError> for io::Error {
    #[inline]
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::InvalidNodeKind(error) => {
                Self::new(io::ErrorKind::InvalidInput, error)
            }
            StoreError::State(error) => Self::other(error),
        }
    }
}

/// An attempt to use or reconfigure a store in a state that does not permit it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    /// Thread-safety can only be changed while the store holds no data.
    #[error("Thread-safety cannot be changed once the store holds data.")]
    ThreadSafetyLocked,
    /// Change tracking can only be changed while the store holds no data.
    #[error("Change tracking cannot be changed once the store holds data.")]
    TrackingLocked,
    /// Rolling back requires change tracking.
    #[error("Rollback is unavailable while change tracking is disabled.")]
    RollbackUnavailable,
    /// The store has been disposed.
    #[error("The store has been disposed.")]
    Disposed,
}
