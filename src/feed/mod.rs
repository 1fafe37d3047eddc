//! Adaptive poll-fetch-dedup-feed loops
//!
//! Every feed runs as its own task and repeats one cycle until cancelled:
//! fetch an artifact, apply it (render or append), ask the scheduler how long
//! to wait, then sleep. A feed never starts a fetch before the previous one
//! has resolved.

pub mod bus;
pub mod dedup;
pub mod frame;
pub mod scheduler;
pub mod segment;
pub mod state;

pub use bus::{ConfigBus, ConfigEvent, Subscription, SubscriptionId};
pub use dedup::DedupGate;
pub use frame::FrameFeedLoop;
pub use scheduler::{AdaptiveScheduler, TickOutcome};
pub use segment::SegmentFeedLoop;
pub use state::{Cadence, FeedState, FeedStats, SharedFeedState};

use async_trait::async_trait;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// One pollable feed
#[async_trait]
pub trait Feed: Send {
    /// Name used in log lines
    fn name(&self) -> String;

    fn state(&self) -> &SharedFeedState;

    fn scheduler(&self) -> &AdaptiveScheduler;

    /// Run a single fetch-and-apply cycle. Never fails; problems are reported
    /// through the outcome.
    async fn tick(&mut self) -> TickOutcome;
}

/// Drive `feed` until `cancel` fires
pub async fn run_feed<F: Feed>(mut feed: F, cancel: CancellationToken) {
    let name = feed.name();
    tracing::info!("{} started", name);

    loop {
        let started = Instant::now();
        let outcome = tokio::select! {
            _ = cancel.cancelled() => break,
            outcome = feed.tick() => outcome,
        };
        let elapsed = started.elapsed();

        let delay = {
            let mut state = feed.state().write();
            state.stats.record(outcome);
            feed.scheduler()
                .delay_after(outcome, state.cadence.target_interval(), elapsed)
        };
        tracing::trace!("{} {:?} in {:?}, next in {:?}", name, outcome, elapsed, delay);

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(delay) => {}
        }
    }

    feed.state().write().running = false;
    tracing::info!("{} stopped", name);
}
