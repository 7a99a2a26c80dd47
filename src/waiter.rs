use may::coroutine;
use may::sync::{AtomicOption, Blocker};

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

/// internal settle-once cell
///
/// Only the first `set_rsp` (or an expiring `wait_rsp`) wins, every later
/// attempt is ignored.
pub(crate) struct Waiter<T> {
    blocker: Blocker,
    settled: AtomicBool,
    rsp: AtomicOption<Box<T>>,
}

impl<T> Waiter<T> {
    pub fn new() -> Self {
        Waiter {
            blocker: Blocker::new(false),
            settled: AtomicBool::new(false),
            rsp: AtomicOption::none(),
        }
    }

    // take the single settlement slot
    fn claim(&self) -> bool {
        self.settled
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn is_settled(&self) -> bool {
        self.settled.load(Ordering::Acquire)
    }

    /// settle with `rsp`, returns false if already settled
    pub fn set_rsp(&self, rsp: T) -> bool {
        if !self.claim() {
            return false;
        }
        // set the response
        self.rsp.store(Box::new(rsp));
        // wake up the blocker
        self.blocker.unpark();
        true
    }

    /// block until settled
    ///
    /// if `deadline` passes first the cell is settled with `expired()`
    pub fn wait_rsp<F>(&self, deadline: Option<Instant>, expired: F) -> T
    where
        F: FnOnce() -> T,
    {
        use may::coroutine::ParkError;
        let mut deadline = deadline;
        loop {
            if let Some(rsp) = self.rsp.take() {
                return *rsp;
            }
            let timeout = deadline.map(|d| d.saturating_duration_since(Instant::now()));
            let parked = match timeout {
                Some(t) if t.is_zero() => Err(ParkError::Timeout),
                _ => self.blocker.park(timeout),
            };
            match parked {
                // the rsp may land a bit after a false wake up, try again
                Ok(_) => {}
                Err(ParkError::Timeout) => {
                    if self.claim() {
                        return expired();
                    }
                    // lost the race against a settling listener, its rsp is on the way
                    deadline = None;
                }
                Err(ParkError::Canceled) => {
                    coroutine::trigger_cancel_panic();
                }
            }
        }
    }
}

impl<T> fmt::Debug for Waiter<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Waiter{{ settled: {} }}", self.is_settled())
    }
}

impl<T> Default for Waiter<T> {
    fn default() -> Self {
        Waiter::new()
    }
}
