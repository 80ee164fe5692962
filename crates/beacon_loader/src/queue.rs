//! Pending-request queue.
//!
//! Every non-empty submission is appended here, even when it is already
//! satisfiable, so that [`PendingQueue::take_ready`] stays the single path
//! through which callers are released.
//!
//! # Dispatch pass
//!
//! [`take_ready`](PendingQueue::take_ready) partitions the queue into
//! satisfied and unsatisfied requests, replaces the queue with the
//! unsatisfied ones, and only then hands back the satisfied completions in
//! submission order. Callers must run those completions after releasing any
//! lock on the queue: a completion may submit again, and that submission has
//! to observe the already-updated queue.

use core::fmt;

use tokio::sync::oneshot;

use crate::descriptor::{ResolvedResource, ResourceDescriptor};

/// What happens when a request is released.
pub enum Completion {
    /// Run a callback.
    Callback(Box<dyn FnOnce() + Send + 'static>),
    /// Resolve a [`Download`](crate::Download) future.
    Notify(oneshot::Sender<()>),
    /// Nothing observable; the request only drives the load.
    Silent,
}

impl Completion {
    /// Fires the completion.
    pub fn fire(self) {
        match self {
            Self::Callback(callback) => callback(),
            Self::Notify(sender) => {
                // The receiver may have been dropped by a caller that lost interest.
                let _ = sender.send(());
            }
            Self::Silent => {}
        }
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Callback(_) => f.write_str("Completion::Callback"),
            Self::Notify(_) => f.write_str("Completion::Notify"),
            Self::Silent => f.write_str("Completion::Silent"),
        }
    }
}

/// An outstanding request waiting for its resource set.
#[derive(Debug)]
pub struct PendingRequest {
    id: u64,
    resources: Vec<ResolvedResource>,
    completion: Completion,
}

impl PendingRequest {
    /// Returns the submission sequence number.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Returns the requested resources with their canonical URLs.
    #[must_use]
    pub fn resources(&self) -> &[ResolvedResource] {
        &self.resources
    }

    /// Iterates the caller's descriptors.
    pub fn descriptors(&self) -> impl Iterator<Item = &ResourceDescriptor> {
        self.resources.iter().map(|resource| &resource.descriptor)
    }
}

/// Ordered list of requests not yet satisfied.
#[derive(Debug, Default)]
pub struct PendingQueue {
    requests: Vec<PendingRequest>,
    next_id: u64,
}

impl PendingQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a request, returning its submission sequence number.
    pub fn push(&mut self, resources: Vec<ResolvedResource>, completion: Completion) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.requests.push(PendingRequest {
            id,
            resources,
            completion,
        });
        id
    }

    /// Removes every request whose resources all satisfy `is_ready`.
    ///
    /// The queue is fully updated before this returns. The released
    /// completions come back in submission order and have not been fired.
    pub fn take_ready<F>(&mut self, mut is_ready: F) -> Vec<Completion>
    where
        F: FnMut(&ResolvedResource) -> bool,
    {
        let (ready, waiting): (Vec<_>, Vec<_>) = core::mem::take(&mut self.requests)
            .into_iter()
            .partition(|request| request.resources.iter().all(&mut is_ready));
        self.requests = waiting;
        ready.into_iter().map(|request| request.completion).collect()
    }

    /// Iterates the waiting requests in submission order.
    pub fn iter(&self) -> impl Iterator<Item = &PendingRequest> {
        self.requests.iter()
    }

    /// Returns the number of waiting requests.
    #[must_use]
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    /// Returns whether nothing is waiting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}
