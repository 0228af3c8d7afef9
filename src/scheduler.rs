//! Drives reconciliation passes on a fixed interval.
//!
//! The first pass runs immediately. A pass is awaited before the timer is
//! polled again, so passes never overlap; ticks missed while a slow pass was
//! running are dropped rather than replayed.

use async_trait::async_trait;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::reconcile::{PassReport, Reconciler};

/// Something that can run one reconciliation pass.
#[async_trait]
pub trait Pass: Send {
    async fn run_pass(&mut self) -> PassReport;
}

#[async_trait]
impl Pass for Reconciler {
    async fn run_pass(&mut self) -> PassReport {
        Reconciler::run_pass(self).await
    }
}

/// Run passes every `interval` until `shutdown` resolves. A pass already
/// in progress when shutdown is requested finishes first. Returns the
/// number of passes run.
pub async fn run<P, S>(pass: &mut P, interval: Duration, shutdown: S) -> u64
where
    P: Pass + ?Sized,
    S: Future<Output = ()>,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tokio::pin!(shutdown);

    let mut passes = 0;
    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => {
                info!(passes, "Shutdown requested, stopping scheduler");
                break;
            }
            _ = ticker.tick() => {
                let started = Instant::now();
                pass.run_pass().await;
                passes += 1;
                let elapsed = started.elapsed();
                if elapsed > interval {
                    debug!(
                        elapsed_ms = elapsed.as_millis() as u64,
                        interval_ms = interval.as_millis() as u64,
                        "Pass overran the interval, skipping missed ticks"
                    );
                }
            }
        }
    }
    passes
}
