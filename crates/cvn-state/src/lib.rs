//! cvn-state
//!
//! Single-writer observable value holder. Every store in the workspace owns
//! exactly one [`StateCell`] and is the sole mutator of it; subscribers get
//! the current value immediately on subscribe plus a change notification for
//! every later publish. There is no history replay.
//!
//! Backed by `tokio::sync::watch`, so a publish atomically replaces the
//! whole value — a concurrent reader sees either the old collection or the
//! new one, never a partial update.

use tokio::sync::watch;

/// A single-writer value holder with snapshot-on-subscribe semantics.
///
/// Not `Clone`: the owning store is the only writer. Hand out read access
/// via [`StateCell::subscribe`].
pub struct StateCell<T> {
    tx: watch::Sender<T>,
}

impl<T> std::fmt::Debug for StateCell<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateCell").finish_non_exhaustive()
    }
}

impl<T: Clone> StateCell<T> {
    pub fn new(initial: T) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    /// Clone of the current value.
    pub fn get(&self) -> T {
        self.tx.borrow().clone()
    }

    /// Publish a new value, replacing the current one and waking all
    /// subscribers.
    pub fn replace(&self, next: T) {
        self.tx.send_replace(next);
    }

    /// Mutate the held value in place under the cell's write lock and wake
    /// all subscribers. Returns whatever the closure returns, which lets
    /// callers report the outcome of the mutation.
    pub fn mutate<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut slot = None;
        self.tx.send_modify(|value| slot = Some(f(value)));
        slot.expect("send_modify invokes the closure exactly once")
    }

    /// Like [`StateCell::mutate`], but the closure reports whether it
    /// actually changed the value; subscribers are only woken when it did.
    /// Use this for operations with a silent no-op path (unknown id,
    /// already-terminal state) so those paths produce no emission.
    pub fn mutate_if<R>(&self, f: impl FnOnce(&mut T) -> (bool, R)) -> R {
        let mut slot = None;
        self.tx.send_if_modified(|value| {
            let (changed, result) = f(value);
            slot = Some(result);
            changed
        });
        slot.expect("send_if_modified invokes the closure exactly once")
    }

    /// New subscriber. `borrow()` on the receiver yields the current value
    /// immediately; `changed()` resolves on the next publish.
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.tx.subscribe()
    }
}

impl<T: Clone + Default> Default for StateCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
