use log::{debug, trace};

use crate::emitter::{EventSource, ListenerId};
use crate::error::OnceError;
use crate::options::{OnceOptions, Verdict};
use crate::waiter::Waiter;

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// result of one `once` wait
pub type Outcome<T> = Result<Vec<T>, OnceError<T>>;

// settle `Timeout` once the deadline has passed, true if this call settled it
fn expire_if_due<T>(
    cell: &Waiter<Outcome<T>>,
    event: &str,
    timeout: Option<Duration>,
    deadline: Option<Instant>,
) -> bool {
    let (Some(timeout), Some(deadline)) = (timeout, deadline) else {
        return false;
    };
    if Instant::now() < deadline || !cell.set_rsp(Err(OnceError::Timeout { timeout })) {
        return false;
    }
    debug!("once `{}` timed out after {:?}", event, timeout);
    true
}

// state shared by the guard types, the listener holds a clone of `waiter`
struct Pending<T> {
    waiter: Arc<Waiter<Outcome<T>>>,
    event: String,
    id: ListenerId,
    timeout: Option<Duration>,
    deadline: Option<Instant>,
}

impl<T> Pending<T>
where
    T: Clone + Send + 'static,
{
    fn arm<S>(source: &S, event: &str, options: OnceOptions<T>) -> Self
    where
        S: EventSource<T> + ?Sized,
    {
        let waiter = Arc::new(Waiter::new());
        let timeout = options.timeout();
        // a deadline past what Instant can hold is no deadline
        let deadline = timeout.and_then(|t| Instant::now().checked_add(t));

        let cell = waiter.clone();
        let name = event.to_owned();
        let listener = move |args: &[T]| {
            if cell.is_settled() {
                return;
            }
            // the deadline fired first, even if nobody has observed it yet
            if expire_if_due(&cell, &name, timeout, deadline) {
                return;
            }
            let verdict = options.judge(args);
            trace!("once `{}` judged occurrence as {:?}", name, verdict);
            let rsp = match verdict {
                Verdict::Resolve => Ok(args.to_vec()),
                Verdict::Reject => Err(OnceError::Rejected {
                    payload: args.to_vec(),
                }),
                Verdict::Ignore => return,
            };
            if cell.set_rsp(rsp) {
                debug!("once `{}` settled by occurrence: {:?}", name, verdict);
            }
        };

        let id = source.subscribe(event, Box::new(listener));
        Pending {
            waiter,
            event: event.to_owned(),
            id,
            timeout,
            deadline,
        }
    }

    fn wait(&self) -> Outcome<T> {
        self.waiter.wait_rsp(self.deadline, || {
            let timeout = self.timeout.unwrap_or_default();
            debug!("once `{}` timed out after {:?}", self.event, timeout);
            Err(OnceError::Timeout { timeout })
        })
    }

    fn release<S>(&self, source: &S)
    where
        S: EventSource<T> + ?Sized,
    {
        if !source.unsubscribe(&self.event, self.id) {
            trace!("once `{}` listener {:?} was already gone", self.event, self.id);
        }
    }

    fn is_settled(&self) -> bool {
        expire_if_due(&self.waiter, &self.event, self.timeout, self.deadline);
        self.waiter.is_settled()
    }
}

/// Wait guard borrowing its event source, returned by [`once`].
///
/// The listener is removed from the source when the guard is dropped.
pub struct OnceGuard<'a, S: EventSource<T> + ?Sized, T: Clone + Send + 'static> {
    source: &'a S,
    pending: Pending<T>,
}

impl<'a, S, T> OnceGuard<'a, S, T>
where
    S: EventSource<T> + ?Sized,
    T: Clone + Send + 'static,
{
    /// block until the outcome is settled
    pub fn wait(self) -> Outcome<T> {
        self.pending.wait()
    }

    /// true once the outcome is decided, including by an expired deadline
    pub fn is_settled(&self) -> bool {
        self.pending.is_settled()
    }

    pub fn event(&self) -> &str {
        &self.pending.event
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.deadline
    }
}

impl<'a, S, T> Drop for OnceGuard<'a, S, T>
where
    S: EventSource<T> + ?Sized,
    T: Clone + Send + 'static,
{
    fn drop(&mut self) {
        // stop observing, the outcome is decided or no longer wanted
        self.pending.release(self.source);
    }
}

impl<'a, S, T> fmt::Debug for OnceGuard<'a, S, T>
where
    S: EventSource<T> + ?Sized,
    T: Clone + Send + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "OnceGuard{{ event: {:?}, ... }}", self.pending.event)
    }
}

/// Wait handle sharing ownership of its event source, returned by [`once_owned`].
///
/// Unlike [`OnceGuard`] it is `'static`, so it can be moved into another coroutine.
pub struct OnceWaiter<S: EventSource<T> + ?Sized, T: Clone + Send + 'static> {
    source: Arc<S>,
    pending: Pending<T>,
}

impl<S, T> OnceWaiter<S, T>
where
    S: EventSource<T> + ?Sized,
    T: Clone + Send + 'static,
{
    /// block until the outcome is settled
    pub fn wait(self) -> Outcome<T> {
        self.pending.wait()
    }

    /// true once the outcome is decided, including by an expired deadline
    pub fn is_settled(&self) -> bool {
        self.pending.is_settled()
    }

    pub fn event(&self) -> &str {
        &self.pending.event
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.deadline
    }
}

impl<S, T> Drop for OnceWaiter<S, T>
where
    S: EventSource<T> + ?Sized,
    T: Clone + Send + 'static,
{
    fn drop(&mut self) {
        self.pending.release(&*self.source);
    }
}

impl<S, T> fmt::Debug for OnceWaiter<S, T>
where
    S: EventSource<T> + ?Sized,
    T: Clone + Send + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "OnceWaiter{{ event: {:?}, ... }}", self.pending.event)
    }
}

/// Subscribe to `event` on `source` and return a guard whose [`wait`](OnceGuard::wait)
/// yields the payload of the first qualifying emission.
///
/// The listener is armed before this returns, so emissions made right after
/// the call are never missed.
///
/// ```
/// use may_once::{once, Emitter, OnceOptions};
///
/// let emitter = Emitter::new();
/// let guard = once(&emitter, "changed", OnceOptions::new());
/// emitter.emit("changed", &["argument"]);
/// assert_eq!(guard.wait().unwrap(), vec!["argument"]);
/// assert_eq!(emitter.listener_count("changed"), 0);
/// ```
pub fn once<'a, S, T>(source: &'a S, event: &str, options: OnceOptions<T>) -> OnceGuard<'a, S, T>
where
    S: EventSource<T> + ?Sized,
    T: Clone + Send + 'static,
{
    let pending = Pending::arm(source, event, options);
    OnceGuard { source, pending }
}

/// Same as [`once`] but the returned handle keeps `source` alive.
pub fn once_owned<S, T>(source: Arc<S>, event: &str, options: OnceOptions<T>) -> OnceWaiter<S, T>
where
    S: EventSource<T> + ?Sized,
    T: Clone + Send + 'static,
{
    let pending = Pending::arm(&*source, event, options);
    OnceWaiter { source, pending }
}
