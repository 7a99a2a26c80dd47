//! Block a coroutine until a named event fires.
//!
//! [`once`] subscribes one listener to a named event on an [`EventSource`]
//! and hands back a guard. The guard's `wait` parks the current coroutine
//! (or thread) until the first qualifying emission, and yields its payload.
//! An optional timeout and optional `resolve_on` / `reject_on` predicates
//! are configured through [`OnceOptions`]. The outcome settles exactly once;
//! later emissions and an expiring deadline are ignored after that.

mod emitter;
mod error;
mod once;
mod options;
mod waiter;

pub use emitter::{Emitter, EventSource, Listener, ListenerId};
pub use error::{ErrorKind, OnceError};
pub use once::{once, once_owned, OnceGuard, OnceWaiter, Outcome};
pub use options::{OnceOptions, Predicate, Verdict};
