//! Live result collection
//!
//! A `QueryList` is the stable container a query owner hands out: cloning it
//! yields another handle to the same collection. Contents only change through
//! `reset`, which the registry calls once per refresh; readers take `Arc<[T]>`
//! snapshots and never observe a partially written list.

use parking_lot::RwLock;
use std::fmt;
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::sync::Arc;

/// Change event delivered to subscribers.
#[derive(Debug, Clone)]
pub struct QueryChange<T> {
    pub version: u64,
    pub items: Arc<[T]>,
}

/// Outcome of polling a subscription.
#[derive(Debug)]
pub enum Poll<T> {
    Change(QueryChange<T>),
    Idle,
    /// The list was destroyed and every pending change has been drained
    Closed,
}

struct ListState<T> {
    items: Arc<[T]>,
    dirty: bool,
    pending_change: bool,
    closed: bool,
    version: u64,
    subscribers: Vec<Sender<QueryChange<T>>>,
}

/// Ordered, observable query results.
pub struct QueryList<T> {
    state: Arc<RwLock<ListState<T>>>,
}

impl<T> Clone for QueryList<T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<T> Default for QueryList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> QueryList<T> {
    /// Empty list, dirty until its first reset.
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(ListState {
                items: Arc::from(Vec::new()),
                dirty: true,
                pending_change: false,
                closed: false,
                version: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    pub fn len(&self) -> usize {
        self.state.read().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().items.is_empty()
    }

    /// Current contents; stays valid across later resets.
    pub fn snapshot(&self) -> Arc<[T]> {
        Arc::clone(&self.state.read().items)
    }

    /// Incremented each time a reset changes the contents.
    pub fn version(&self) -> u64 {
        self.state.read().version
    }

    pub fn is_dirty(&self) -> bool {
        self.state.read().dirty
    }

    /// Force the next refresh to recompute regardless of tree revisions.
    pub fn set_dirty(&self) {
        self.state.write().dirty = true;
    }

    pub fn is_closed(&self) -> bool {
        self.state.read().closed
    }

    /// Whether both handles point at the same collection.
    pub fn same_list(&self, other: &QueryList<T>) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }

    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> Vec<U> {
        self.snapshot().iter().map(f).collect()
    }

    pub fn any(&self, mut f: impl FnMut(&T) -> bool) -> bool {
        self.snapshot().iter().any(|item| f(item))
    }

    pub fn for_each(&self, f: impl FnMut(&T)) {
        self.snapshot().iter().for_each(f)
    }

    /// Receive a change event for every later refresh that changes the contents.
    pub fn subscribe(&self) -> Subscription<T> {
        let (sender, receiver) = channel();
        let mut state = self.state.write();
        if !state.closed {
            state.subscribers.push(sender);
        }
        Subscription { receiver }
    }

    /// Complete every subscription; later resets and notifications are no-ops.
    pub fn destroy(&self) {
        let mut state = self.state.write();
        state.closed = true;
        state.pending_change = false;
        state.subscribers.clear();
    }
}

impl<T: Clone> QueryList<T> {
    pub fn first(&self) -> Option<T> {
        self.state.read().items.first().cloned()
    }

    pub fn last(&self) -> Option<T> {
        self.state.read().items.last().cloned()
    }

    pub fn get(&self, index: usize) -> Option<T> {
        self.state.read().items.get(index).cloned()
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.snapshot().to_vec()
    }

    /// Iterate over the contents as of this call.
    pub fn iter_snapshot(&self) -> impl Iterator<Item = T> {
        let items = self.snapshot();
        (0..items.len()).map(move |i| items[i].clone())
    }

    pub fn filter(&self, mut f: impl FnMut(&T) -> bool) -> Vec<T> {
        self.snapshot().iter().filter(|item| f(item)).cloned().collect()
    }

    pub fn find(&self, mut f: impl FnMut(&T) -> bool) -> Option<T> {
        self.snapshot().iter().find(|item| f(item)).cloned()
    }

    /// Broadcast one change event if the last reset changed the contents.
    pub fn notify_on_changes(&self) -> bool {
        let mut state = self.state.write();
        if state.closed || !state.pending_change {
            return false;
        }
        state.pending_change = false;
        let change = QueryChange {
            version: state.version,
            items: Arc::clone(&state.items),
        };
        // receivers that hung up are pruned
        state
            .subscribers
            .retain(|subscriber| subscriber.send(change.clone()).is_ok());
        true
    }
}

impl<T: PartialEq> QueryList<T> {
    /// Replace the contents and clear the dirty flag.
    ///
    /// Returns false and schedules no notification when `values` equals the
    /// current contents, or when the list has been destroyed.
    pub fn reset(&self, values: Vec<T>) -> bool {
        let mut state = self.state.write();
        if state.closed {
            return false;
        }
        state.dirty = false;
        if *state.items == *values {
            return false;
        }
        state.items = Arc::from(values);
        state.version += 1;
        state.pending_change = true;
        true
    }
}

impl<T: fmt::Debug> fmt::Debug for QueryList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("QueryList")
            .field("items", &state.items)
            .field("version", &state.version)
            .field("dirty", &state.dirty)
            .field("closed", &state.closed)
            .finish()
    }
}

/// Receiving end of a `QueryList` subscription.
pub struct Subscription<T> {
    receiver: Receiver<QueryChange<T>>,
}

impl<T> Subscription<T> {
    /// Next pending change without blocking.
    pub fn poll(&self) -> Poll<T> {
        match self.receiver.try_recv() {
            Ok(change) => Poll::Change(change),
            Err(TryRecvError::Empty) => Poll::Idle,
            Err(TryRecvError::Disconnected) => Poll::Closed,
        }
    }

    /// All pending changes, oldest first.
    pub fn drain(&self) -> Vec<QueryChange<T>> {
        self.receiver.try_iter().collect()
    }
}
