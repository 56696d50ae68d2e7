//! Bounded-concurrency work queue with cooperative cancellation.

use futures::stream::{self, StreamExt};
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Runs one async job per item, at most `concurrency` at a time.
///
/// Cancellation stops dispatching: items already started run to completion,
/// the rest are reported as not started.
#[derive(Debug, Clone)]
pub struct WorkQueue {
    concurrency: usize,
    delay: Duration,
}

/// Outcome of a queue run
#[derive(Debug)]
pub struct QueueReport<T> {
    /// Results of the items that ran, in input order
    pub results: Vec<T>,
    /// Items never started because the run was cancelled
    pub not_started: usize,
    pub cancelled: bool,
}

impl WorkQueue {
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
            delay: Duration::ZERO,
        }
    }

    /// Pause before each job starts (politeness towards crawled hosts)
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub async fn run<I, T, F, Fut>(
        &self,
        items: Vec<I>,
        token: &CancellationToken,
        job: F,
    ) -> QueueReport<T>
    where
        F: Fn(I) -> Fut,
        Fut: Future<Output = T>,
    {
        let total = items.len();
        let delay = self.delay;

        let mut results: Vec<(usize, T)> = stream::iter(items.into_iter().enumerate())
            .take_while(|_| futures::future::ready(!token.is_cancelled()))
            .map(|(index, item)| {
                let fut = job(item);
                async move {
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    (index, fut.await)
                }
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        results.sort_by_key(|(index, _)| *index);

        QueueReport {
            not_started: total - results.len(),
            cancelled: token.is_cancelled(),
            results: results.into_iter().map(|(_, result)| result).collect(),
        }
    }
}
