//! Configuration of a single [`once`](crate::once) wait.
//!
//! Every field is optional:
//! - `timeout`: deadline measured from the call to `once`, `None` waits forever.
//! - `resolve_on`: an occurrence settles success only if it returns `true`.
//! - `reject_on`: an occurrence settles failure if it returns `true`.
//!
//! With neither predicate set the first occurrence resolves. With one or both
//! set, `reject_on` is asked first, so an occurrence matching both rejects.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// A predicate over the payload of one emission.
pub type Predicate<T> = Arc<dyn Fn(&[T]) -> bool + Send + Sync>;

/// What one occurrence decides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Resolve,
    Reject,
    /// keep listening
    Ignore,
}

/// Options for [`once`](crate::once).
///
/// ```
/// use may_once::OnceOptions;
/// use std::time::Duration;
///
/// let opts = OnceOptions::<&str>::new()
///     .with_timeout(Duration::from_millis(100))
///     .resolve_on(|args| args.first() == Some(&"pass"))
///     .reject_on(|args| args.first() == Some(&"fail"));
/// assert_eq!(opts.timeout(), Some(Duration::from_millis(100)));
/// ```
pub struct OnceOptions<T> {
    timeout: Option<Duration>,
    resolve_on: Option<Predicate<T>>,
    reject_on: Option<Predicate<T>>,
}

impl<T> OnceOptions<T> {
    pub fn new() -> Self {
        OnceOptions {
            timeout: None,
            resolve_on: None,
            reject_on: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_timeout_ms(self, millis: u64) -> Self {
        self.with_timeout(Duration::from_millis(millis))
    }

    pub fn resolve_on<F>(mut self, f: F) -> Self
    where
        F: Fn(&[T]) -> bool + Send + Sync + 'static,
    {
        self.resolve_on = Some(Arc::new(f));
        self
    }

    pub fn reject_on<F>(mut self, f: F) -> Self
    where
        F: Fn(&[T]) -> bool + Send + Sync + 'static,
    {
        self.reject_on = Some(Arc::new(f));
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// true when no predicate is configured and the first occurrence resolves
    pub fn is_fire_once(&self) -> bool {
        self.resolve_on.is_none() && self.reject_on.is_none()
    }

    /// Decide what the occurrence carrying `args` does to the outcome.
    pub fn judge(&self, args: &[T]) -> Verdict {
        if self.is_fire_once() {
            return Verdict::Resolve;
        }
        if let Some(reject_on) = &self.reject_on {
            if reject_on(args) {
                return Verdict::Reject;
            }
        }
        if let Some(resolve_on) = &self.resolve_on {
            if resolve_on(args) {
                return Verdict::Resolve;
            }
        }
        Verdict::Ignore
    }
}

impl<T> Clone for OnceOptions<T> {
    fn clone(&self) -> Self {
        OnceOptions {
            timeout: self.timeout,
            resolve_on: self.resolve_on.clone(),
            reject_on: self.reject_on.clone(),
        }
    }
}

impl<T> Default for OnceOptions<T> {
    fn default() -> Self {
        OnceOptions::new()
    }
}

impl<T> fmt::Debug for OnceOptions<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("OnceOptions")
            .field("timeout", &self.timeout)
            .field("resolve_on", &self.resolve_on.is_some())
            .field("reject_on", &self.reject_on.is_some())
            .finish()
    }
}
