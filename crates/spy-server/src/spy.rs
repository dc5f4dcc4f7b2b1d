use std::sync::{Arc, Mutex};

use crate::request::RecordedRequest;

/// Per-fixture record of every request the fixture received.
///
/// A `Spy` is a cheap cloneable handle; the recording step installed ahead of
/// the fixture's chain holds one clone, test code holds another, and both see
/// the same append-only history. Each server instance creates its own spies —
/// installing the same fixture on two servers yields two independent records.
///
/// `call_count`, `called`, `first_request`, and `last_request` are all derived
/// from the request list, so they can never disagree with it. Appends happen
/// under a mutex with no await point inside, so the list order is the order in
/// which the dispatcher delivered requests into the fixture's chain.
#[derive(Clone, Default)]
pub struct Spy {
    requests: Arc<Mutex<Vec<Arc<RecordedRequest>>>>,
}

impl Spy {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Append one observed request. Called only by the recording step.
    pub(crate) fn record(&self, req: Arc<RecordedRequest>) {
        let mut requests = self.requests.lock().unwrap();
        requests.push(req);
        tracing::debug!(call_count = requests.len(), "spy recorded request");
    }

    /// Number of requests observed so far.
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Whether at least one request has been observed.
    pub fn called(&self) -> bool {
        self.call_count() > 0
    }

    /// The first observed request, or `None` before any arrived.
    pub fn first_request(&self) -> Option<Arc<RecordedRequest>> {
        self.requests.lock().unwrap().first().cloned()
    }

    /// The most recently observed request, or `None` before any arrived.
    pub fn last_request(&self) -> Option<Arc<RecordedRequest>> {
        self.requests.lock().unwrap().last().cloned()
    }

    /// Every observed request, in arrival order.
    pub fn requests(&self) -> Vec<Arc<RecordedRequest>> {
        self.requests.lock().unwrap().clone()
    }
}

impl std::fmt::Debug for Spy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Spy")
            .field("call_count", &self.call_count())
            .finish_non_exhaustive()
    }
}
