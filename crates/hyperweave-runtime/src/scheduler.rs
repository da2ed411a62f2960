//! Cooperative yielding

use async_trait::async_trait;

/// Something that can suspend the current task so others may run
#[async_trait]
pub trait Scheduler: Send + Sync {
    /// Give up control until the executor polls this task again
    async fn yield_now(&self);
}

/// Yields through `tokio::task::yield_now`
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioScheduler;

#[async_trait]
impl Scheduler for TokioScheduler {
    async fn yield_now(&self) {
        tokio::task::yield_now().await;
    }
}

#[async_trait]
impl<T: Scheduler + ?Sized> Scheduler for std::sync::Arc<T> {
    async fn yield_now(&self) {
        (**self).yield_now().await;
    }
}

/// How often a transform yields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YieldPolicy {
    /// Records processed between yields
    pub every: usize,
}

impl YieldPolicy {
    /// Yield after every `every` records. Zero is treated as one.
    pub fn every(every: usize) -> Self {
        Self {
            every: every.max(1),
        }
    }
}

impl Default for YieldPolicy {
    fn default() -> Self {
        Self { every: 1 }
    }
}

/// Counts processed records against a [`YieldPolicy`]
#[derive(Debug)]
pub(crate) struct Cadence {
    every: usize,
    pending: usize,
}

impl Cadence {
    pub(crate) fn new(policy: YieldPolicy) -> Self {
        Self {
            every: policy.every.max(1),
            pending: 0,
        }
    }

    /// Record one processed item; true when a yield is due
    pub(crate) fn tick(&mut self) -> bool {
        self.pending += 1;
        if self.pending >= self.every {
            self.pending = 0;
            true
        } else {
            false
        }
    }
}
