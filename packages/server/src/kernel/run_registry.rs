//! Cancellation tokens of running batch jobs, keyed by batch.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;

use crate::common::BatchId;

#[derive(Default)]
struct Runs {
    entries: HashMap<BatchId, Entry>,
    next_generation: u64,
}

struct Entry {
    token: CancellationToken,
    generation: u64,
    active: usize,
}

#[derive(Default)]
pub struct RunRegistry {
    runs: Mutex<Runs>,
}

/// Registration of one running job; unregisters on drop.
pub struct RunGuard {
    registry: Arc<RunRegistry>,
    batch_id: BatchId,
    generation: u64,
    token: CancellationToken,
}

impl RunRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn lock(&self) -> MutexGuard<'_, Runs> {
        // The map stays consistent even if a holder panicked
        self.runs.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register a job for `batch_id`. Jobs running on the same batch share a
    /// token, so one cancel stops all of them.
    pub fn start(self: &Arc<Self>, batch_id: BatchId) -> RunGuard {
        let mut runs = self.lock();
        let generation = runs.next_generation;

        let entry = runs.entries.entry(batch_id).or_insert_with(|| Entry {
            token: CancellationToken::new(),
            generation,
            active: 0,
        });
        entry.active += 1;

        let guard = RunGuard {
            registry: Arc::clone(self),
            batch_id,
            generation: entry.generation,
            token: entry.token.clone(),
        };
        runs.next_generation += 1;
        guard
    }

    /// Cancel every running job of the batch. Returns false when none was running.
    pub fn cancel(&self, batch_id: BatchId) -> bool {
        match self.lock().entries.remove(&batch_id) {
            Some(entry) => {
                entry.token.cancel();
                true
            }
            None => false,
        }
    }

    pub fn is_running(&self, batch_id: BatchId) -> bool {
        self.lock().entries.contains_key(&batch_id)
    }
}

impl RunGuard {
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        let mut runs = self.registry.lock();
        // After a cancel the batch may already hold a newer run; leave that one alone
        let finished = match runs.entries.get_mut(&self.batch_id) {
            Some(entry) if entry.generation == self.generation => {
                entry.active -= 1;
                entry.active == 0
            }
            _ => false,
        };
        if finished {
            runs.entries.remove(&self.batch_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_reaches_all_runs_of_a_batch() {
        let registry = RunRegistry::new();
        let batch = BatchId::new();
        let scrape = registry.start(batch);
        let matching = registry.start(batch);

        assert!(registry.cancel(batch));
        assert!(scrape.token().is_cancelled());
        assert!(matching.token().is_cancelled());
        assert!(!registry.cancel(batch));
    }

    #[test]
    fn test_guard_drop_unregisters() {
        let registry = RunRegistry::new();
        let batch = BatchId::new();

        let first = registry.start(batch);
        let second = registry.start(batch);
        drop(first);
        assert!(registry.is_running(batch));
        drop(second);
        assert!(!registry.is_running(batch));
    }

    #[test]
    fn test_old_guard_does_not_remove_new_run() {
        let registry = RunRegistry::new();
        let batch = BatchId::new();

        let old = registry.start(batch);
        registry.cancel(batch);
        let fresh = registry.start(batch);
        drop(old);

        assert!(registry.is_running(batch));
        assert!(!fresh.token().is_cancelled());
    }
}
