use crate::ptr::Gc;
use thiserror::Error;

/// Recoverable failures of collector operations.
///
/// Contract violations (an `unpin` without a matching `pin`) are not
/// reported here; [`Collector::unpin`](crate::Collector::unpin) panics on
/// them. [`Collector::try_unpin`](crate::Collector::try_unpin) is the
/// non-panicking variant and returns [`GcError::NotPinned`].
///
/// 收集器操作的可恢复错误。
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum GcError {
    /// The handle refers to a slot that has been freed or never existed.
    #[error("handle {0} does not refer to a live object")]
    StaleHandle(Gc),
    /// `unpin` was called without a matching outstanding `pin`.
    #[error("unpin of {0} without a matching pin")]
    NotPinned(Gc),
}

/// Result alias used throughout the crate.
pub type Result<T, E = GcError> = std::result::Result<T, E>;
