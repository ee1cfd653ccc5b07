// Power flicker sequence: an interval of flicker ticks, a hold phase, then the
// terminal status after the settle delay.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior, interval_at, sleep};

use super::Shared;
use crate::error::{Error, Result};
use crate::models::ConnectionStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceTiming {
    pub tick_interval: Duration,
    pub settle_delay: Duration,
    pub power_on_flickers: u32,
    pub power_off_flickers: u32,
}

impl Default for SequenceTiming {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(500),
            settle_delay: Duration::from_millis(500),
            power_on_flickers: 5,
            power_off_flickers: 2,
        }
    }
}

impl SequenceTiming {
    /// The flicker ticks run on a `tokio::time::Interval`, which needs a non-zero period.
    pub fn validate(&self) -> Result<()> {
        if self.tick_interval.is_zero() {
            return Err(Error::InvalidArgument(
                "tick_interval must be > 0".into(),
            ));
        }
        Ok(())
    }
}

/// Statuses visited by one power transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequencePlan {
    /// Set synchronously when power is toggled.
    pub start: ConnectionStatus,
    /// Set on the tick that finds the flicker budget exhausted.
    pub hold: ConnectionStatus,
    /// Set once the settle delay has elapsed.
    pub terminal: ConnectionStatus,
    pub flickers: u32,
}

impl SequencePlan {
    pub fn power_on(timing: &SequenceTiming) -> Self {
        Self {
            start: ConnectionStatus::ConnectingPhaseA,
            hold: ConnectionStatus::ConnectingPhaseB,
            terminal: ConnectionStatus::Connected,
            flickers: timing.power_on_flickers,
        }
    }

    pub fn power_off(timing: &SequenceTiming) -> Self {
        Self {
            start: ConnectionStatus::ConnectingPhaseB,
            hold: ConnectionStatus::ConnectingPhaseA,
            terminal: ConnectionStatus::Off,
            flickers: timing.power_off_flickers,
        }
    }

    pub fn for_power(powered_on: bool, timing: &SequenceTiming) -> Self {
        if powered_on {
            Self::power_on(timing)
        } else {
            Self::power_off(timing)
        }
    }

    /// Time from the toggle until the terminal status is set. The budget check
    /// consumes one extra tick after the last flicker.
    pub fn duration(&self, timing: &SequenceTiming) -> Duration {
        timing.tick_interval * (self.flickers + 1) + timing.settle_delay
    }
}

/// Drives one sequence to completion. Every write is fenced by `generation`, so
/// a sequence superseded by a later toggle stops at its next step even if its
/// task has not been aborted yet.
pub(super) async fn run(
    shared: Arc<Shared>,
    plan: SequencePlan,
    timing: SequenceTiming,
    generation: u64,
    started: Instant,
) {
    let mut tick = interval_at(started + timing.tick_interval, timing.tick_interval);
    tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut flickers = 0;
    loop {
        tick.tick().await;
        if flickers >= plan.flickers {
            break;
        }
        if !shared.apply(generation, "flicker", ConnectionStatus::flicker) {
            return;
        }
        flickers += 1;
    }

    if !shared.apply(generation, "hold", |_| plan.hold) {
        return;
    }
    sleep(timing.settle_delay).await;
    if shared.apply(generation, "settle", |_| plan.terminal) {
        tracing::debug!(status = %plan.terminal, "Power sequence settled");
    }
}
