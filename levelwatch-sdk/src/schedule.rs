//! Periodic scheduling shared by the three loops.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::debug;

/// One periodic unit of work.
#[async_trait]
pub(crate) trait Activity: Send + 'static {
    /// Name used in log lines.
    const NAME: &'static str;

    /// Run one iteration. Must not hold a state lock across an `.await`.
    async fn tick(&mut self);
}

/// Run `activity` every `period` until `stop` flips to `true` or its sender
/// is dropped, then hand the activity back.
///
/// The first tick fires immediately. A stop request is only observed between
/// ticks, so an iteration in progress always completes.
pub(crate) async fn run_periodic<A: Activity>(
    mut activity: A,
    period: Duration,
    mut stop: watch::Receiver<bool>,
) -> A {
    let mut timer = tokio::time::interval(period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

    debug!("{} loop started (every {:?})", A::NAME, period);

    while !*stop.borrow() {
        tokio::select! {
            biased;

            changed = stop.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = timer.tick() => {
                activity.tick().await;
            }
        }
    }

    debug!("{} loop stopped", A::NAME);
    activity
}
