//! Interval-based flush scheduler.
//!
//! Each registration spawns a cancellable `tokio::time::interval` loop that
//! invokes the callback once per period until its handle (or the scheduler
//! itself) is cancelled. The spec grammar is an interval expression:
//! `"250ms"`, `"30s"`, `"5m"`, `"2h"`, or bare digits meaning seconds.
//! Cron-capable schedulers can implement [`FlushScheduler`] externally.

use crate::error::SkylogError;
use crate::port::{FlushCallback, FlushScheduler, ScheduleHandle};
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::debug;

pub struct IntervalScheduler {
    root: CancellationToken,
}

impl IntervalScheduler {
    pub fn new() -> Self {
        Self {
            root: CancellationToken::new(),
        }
    }

    /// Cancels every schedule registered through this scheduler.
    pub fn shutdown(&self) {
        self.root.cancel();
    }
}

impl Default for IntervalScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl FlushScheduler for IntervalScheduler {
    fn schedule(&self, spec: &str, callback: FlushCallback) -> Result<ScheduleHandle, SkylogError> {
        let period = parse_interval(spec)?;
        let token = self.root.child_token();
        let job = token.clone();

        debug!(spec, ?period, "Registering recurring flush");

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick completes immediately; consume it so the
            // callback only fires after a full period has elapsed.
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = ticker.tick() => callback(),
                    () = job.cancelled() => break,
                }
            }
        });

        Ok(ScheduleHandle::new(token))
    }
}

/// Parses an interval expression into a `Duration`.
fn parse_interval(spec: &str) -> Result<Duration, SkylogError> {
    let spec = spec.trim();
    let digits = spec
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(spec.len());
    let (value, unit) = spec.split_at(digits);
    let value: u64 = value
        .parse()
        .map_err(|_| SkylogError::Config(format!("invalid flush schedule '{spec}'")))?;

    let period = match unit {
        "ms" => Duration::from_millis(value),
        "" | "s" => Duration::from_secs(value),
        "m" => Duration::from_secs(value * 60),
        "h" => Duration::from_secs(value * 3600),
        _ => {
            return Err(SkylogError::Config(format!(
                "invalid flush schedule '{spec}': unknown unit '{unit}'"
            )));
        }
    };

    if period.is_zero() {
        return Err(SkylogError::Config(format!(
            "flush schedule '{spec}' must be a positive interval"
        )));
    }
    Ok(period)
}
