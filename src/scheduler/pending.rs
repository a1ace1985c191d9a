use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

/// Holds one slot of the submitted-but-unfinished budget until dropped.
pub(super) struct PendingGuard {
    counter: Arc<AtomicUsize>,
}

impl PendingGuard {
    /// Reserves a slot, or returns `None` when `limit` slots are taken.
    pub(super) fn try_acquire(counter: &Arc<AtomicUsize>, limit: usize) -> Option<Self> {
        counter
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                if current >= limit {
                    None
                } else {
                    current.checked_add(1)
                }
            })
            .ok()?;
        Some(Self {
            counter: Arc::clone(counter),
        })
    }
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        drop(
            self.counter
                .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                    current.checked_sub(1)
                }),
        );
    }
}
