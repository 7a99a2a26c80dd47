//! Failure values of a [`once`](crate::once) wait.
//!
//! Both failure paths share one tagged type so callers can tell a deadline
//! expiry apart from an occurrence that matched `reject_on`.

use std::io;
use std::time::Duration;
use thiserror::Error;

/// Discriminant of [`OnceError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No qualifying occurrence arrived before the deadline.
    Timeout,
    /// An occurrence satisfied the `reject_on` predicate.
    Rejected,
}

/// # Errors produced by waiting on an event.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OnceError<T> {
    /// The configured deadline passed before the outcome was decided.
    #[error("once timed out after {}ms", .timeout.as_millis())]
    Timeout {
        /// The configured timeout.
        timeout: Duration,
    },

    /// The `reject_on` predicate returned `true` for an occurrence.
    #[error("once rejected by occurrence with {} payload value(s)", .payload.len())]
    Rejected {
        /// Payload of the rejecting occurrence, in emission order.
        payload: Vec<T>,
    },
}

impl<T> OnceError<T> {
    pub fn kind(&self) -> ErrorKind {
        match self {
            OnceError::Timeout { .. } => ErrorKind::Timeout,
            OnceError::Rejected { .. } => ErrorKind::Rejected,
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use may_once::OnceError;
    /// use std::time::Duration;
    ///
    /// let err = OnceError::<u8>::Timeout { timeout: Duration::from_millis(5) };
    /// assert_eq!(err.as_label(), "once_timeout");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            OnceError::Timeout { .. } => "once_timeout",
            OnceError::Rejected { .. } => "once_rejected",
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, OnceError::Timeout { .. })
    }

    /// The rejecting payload, `None` for a timeout.
    pub fn payload(&self) -> Option<&[T]> {
        match self {
            OnceError::Rejected { payload } => Some(payload.as_slice()),
            OnceError::Timeout { .. } => None,
        }
    }

    pub fn into_payload(self) -> Option<Vec<T>> {
        match self {
            OnceError::Rejected { payload } => Some(payload),
            OnceError::Timeout { .. } => None,
        }
    }
}

impl<T> From<OnceError<T>> for io::Error {
    fn from(e: OnceError<T>) -> Self {
        // the payload is dropped, io::Error only carries the message
        let msg = e.to_string();
        match e.kind() {
            ErrorKind::Timeout => io::Error::new(io::ErrorKind::TimedOut, msg),
            ErrorKind::Rejected => io::Error::new(io::ErrorKind::Other, msg),
        }
    }
}
