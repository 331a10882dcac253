use std::sync::atomic::{AtomicU64, Ordering};

use hostbridge_protocol::RequestId;

/// Monotonic source of request ids for one context.
#[derive(Debug)]
pub struct RequestIdAllocator {
    next: AtomicU64,
}

impl RequestIdAllocator {
    pub fn new(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }

    /// Hand out the next id. Wraps around at `u64::MAX`.
    pub fn next(&self) -> RequestId {
        RequestId(self.next.fetch_add(1, Ordering::Relaxed))
    }

    /// Hand out the next id for which `in_use` is false.
    ///
    /// Only ids that `in_use` reports are skipped. The dispatcher reports
    /// ids with a registered callback, so a callback-less request still
    /// outstanding after a full `u64` wraparound can share its id with a
    /// new one.
    pub fn next_free(&self, in_use: impl Fn(RequestId) -> bool) -> RequestId {
        loop {
            let id = self.next();
            if !in_use(id) {
                return id;
            }
        }
    }

    /// The id the next call to [`Self::next`] would return.
    pub fn peek(&self) -> RequestId {
        RequestId(self.next.load(Ordering::Relaxed))
    }
}

impl Default for RequestIdAllocator {
    fn default() -> Self {
        Self::new(0)
    }
}
