//! Errors surfaced by guarded calls.

use thiserror::Error;

/// Outcome of a guarded call that did not produce a value.
///
/// `Open` and `TooManyRequests` are the only errors the breaker originates.
/// Anything the dependency returns comes back untouched in `Dependency`.
#[derive(Debug, Error)]
pub enum BreakerError<E> {
    #[error("circuit breaker '{name}' is open")]
    Open { name: String },

    #[error("circuit breaker '{name}' is half-open and its probe slots are taken")]
    TooManyRequests { name: String },

    #[error(transparent)]
    Dependency(E),
}

impl<E> BreakerError<E> {
    /// True when the call was refused before reaching the dependency.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            BreakerError::Open { .. } | BreakerError::TooManyRequests { .. }
        )
    }

    /// The dependency's own error, if that is what this is.
    pub fn into_dependency(self) -> Option<E> {
        match self {
            BreakerError::Dependency(e) => Some(e),
            _ => None,
        }
    }

    /// Label used for the rejection metric.
    pub(crate) fn reason(&self) -> &'static str {
        match self {
            BreakerError::Open { .. } => "open",
            BreakerError::TooManyRequests { .. } => "too_many_requests",
            BreakerError::Dependency(_) => "dependency",
        }
    }
}
