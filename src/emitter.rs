//! Named-event sources.
//!
//! [`EventSource`] is the only capability a [`once`](crate::once) wait needs:
//! subscribe a listener under a name and remove it again. [`Emitter`] is an
//! in-process implementation that invokes listeners synchronously, in
//! subscription order, on the emitting coroutine.

use dashmap::DashMap;
use log::trace;
use sharded_slab::Slab;

use std::fmt;

/// A listener receives the payload of every emission of its event.
pub type Listener<T> = Box<dyn Fn(&[T]) + Send + Sync>;

/// the id returned from `EventSource::subscribe`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(usize);

impl From<ListenerId> for usize {
    fn from(id: ListenerId) -> Self {
        id.0
    }
}

/// Anything that supports named-event subscription.
pub trait EventSource<T> {
    /// Register `listener` for `event`. It stays registered until unsubscribed.
    fn subscribe(&self, event: &str, listener: Listener<T>) -> ListenerId;

    /// Remove a listener, returns false if it was not registered under `event`.
    fn unsubscribe(&self, event: &str, id: ListenerId) -> bool;
}

/// Event emitter that could be shared between coroutines
pub struct Emitter<T> {
    // event name -> listener ids in subscription order
    names: DashMap<String, Vec<usize>>,
    listeners: Slab<Listener<T>>,
}

impl<T> fmt::Debug for Emitter<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Emitter{{ events: {} }}", self.names.len())
    }
}

impl<T> Default for Emitter<T> {
    fn default() -> Self {
        Emitter::new()
    }
}

impl<T> Emitter<T> {
    pub fn new() -> Self {
        Emitter {
            names: DashMap::new(),
            listeners: Slab::new(),
        }
    }

    /// Call every listener of `event` with `args`, returns how many ran.
    ///
    /// The id list is copied out before any listener runs, so a listener is
    /// free to subscribe or unsubscribe on this emitter.
    pub fn emit(&self, event: &str, args: &[T]) -> usize {
        let ids = match self.names.get(event) {
            Some(ids) => ids.value().clone(),
            None => return 0,
        };

        let mut count = 0;
        for id in ids {
            // removed since the snapshot
            let Some(listener) = self.listeners.get(id) else {
                continue;
            };
            (*listener)(args);
            count += 1;
        }
        trace!("emitted `{}` with {} value(s) to {} listener(s)", event, args.len(), count);
        count
    }

    /// number of listeners registered under `event`
    pub fn listener_count(&self, event: &str) -> usize {
        self.names.get(event).map_or(0, |ids| ids.len())
    }
}

impl<T> EventSource<T> for Emitter<T> {
    fn subscribe(&self, event: &str, listener: Listener<T>) -> ListenerId {
        let id = self.listeners.insert(listener).expect("no slot available");
        self.names.entry(event.to_owned()).or_default().push(id);
        trace!("subscribed listener {} to `{}`", id, event);
        ListenerId(id)
    }

    fn unsubscribe(&self, event: &str, id: ListenerId) -> bool {
        let found = match self.names.get_mut(event) {
            Some(mut ids) => {
                let before = ids.len();
                ids.retain(|i| *i != id.0);
                ids.len() != before
            }
            None => false,
        };
        if !found {
            return false;
        }
        self.names.remove_if(event, |_, ids| ids.is_empty());
        self.listeners.remove(id.0);
        trace!("unsubscribed listener {} from `{}`", id.0, event);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    #[test]
    fn emit_reaches_only_named_listeners() {
        let emitter = Emitter::<&str>::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_1 = seen.clone();
        emitter.subscribe(
            "changed",
            Box::new(move |args| seen_1.lock().unwrap().push(args.to_vec())),
        );

        assert_eq!(emitter.emit("not changed", &["nope"]), 0);
        assert_eq!(emitter.emit("changed", &["a", "b"]), 1);
        assert_eq!(emitter.emit("changed", &[]), 1);

        let seen = seen.lock().unwrap();
        assert_eq!(*seen, vec![vec!["a", "b"], vec![]]);
    }

    #[test]
    fn listeners_run_in_subscription_order() {
        let emitter = Emitter::<u32>::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        for tag in 0..3 {
            let order = order.clone();
            emitter.subscribe("tick", Box::new(move |_| order.lock().unwrap().push(tag)));
        }
        assert_eq!(emitter.emit("tick", &[7]), 3);
        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn unsubscribe_removes_listener() {
        let emitter = Emitter::<u32>::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let hits_1 = hits.clone();
        let id = emitter.subscribe(
            "tick",
            Box::new(move |_| {
                hits_1.fetch_add(1, Ordering::SeqCst);
            }),
        );
        assert_eq!(emitter.listener_count("tick"), 1);

        // wrong name does not remove it
        assert!(!emitter.unsubscribe("tock", id));
        assert!(emitter.unsubscribe("tick", id));
        assert!(!emitter.unsubscribe("tick", id));
        assert_eq!(emitter.listener_count("tick"), 0);

        assert_eq!(emitter.emit("tick", &[1]), 0);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn listener_can_unsubscribe_itself() {
        let emitter = Arc::new(Emitter::<u32>::new());
        let slot = Arc::new(Mutex::new(None::<ListenerId>));
        let hits = Arc::new(AtomicUsize::new(0));

        let (e, s, h) = (emitter.clone(), slot.clone(), hits.clone());
        let id = emitter.subscribe(
            "tick",
            Box::new(move |_| {
                h.fetch_add(1, Ordering::SeqCst);
                if let Some(id) = s.lock().unwrap().take() {
                    e.unsubscribe("tick", id);
                }
            }),
        );
        *slot.lock().unwrap() = Some(id);

        assert_eq!(emitter.emit("tick", &[1]), 1);
        assert_eq!(emitter.emit("tick", &[2]), 0);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
