use serde::Deserialize;
use std::time::Duration;

use crate::device_status::SequenceTiming;

/// Upper bound for `metrics.seed_days` (ten years of demo data).
pub const MAX_SEED_DAYS: u32 = 3650;

/// Upper bound for the flicker counts of either power sequence.
pub const MAX_FLICKERS: u32 = 100;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub sequencer: SequencerConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub events: EventsConfig,
}

/// Timing of the power flicker sequence.
#[derive(Debug, Clone, Deserialize)]
pub struct SequencerConfig {
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// Hold time between the last flicker tick and the terminal status.
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
    #[serde(default = "default_power_on_flickers")]
    pub power_on_flickers: u32,
    #[serde(default = "default_power_off_flickers")]
    pub power_off_flickers: u32,
}

fn default_tick_interval_ms() -> u64 {
    500
}

fn default_settle_delay_ms() -> u64 {
    500
}

fn default_power_on_flickers() -> u32 {
    5
}

fn default_power_off_flickers() -> u32 {
    2
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            settle_delay_ms: default_settle_delay_ms(),
            power_on_flickers: default_power_on_flickers(),
            power_off_flickers: default_power_off_flickers(),
        }
    }
}

impl SequencerConfig {
    pub fn timing(&self) -> SequenceTiming {
        SequenceTiming {
            tick_interval: Duration::from_millis(self.tick_interval_ms),
            settle_delay: Duration::from_millis(self.settle_delay_ms),
            power_on_flickers: self.power_on_flickers,
            power_off_flickers: self.power_off_flickers,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    /// Number of days before today seeded with demo data at startup.
    #[serde(default = "default_seed_days")]
    pub seed_days: u32,
}

fn default_seed_days() -> u32 {
    6
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            seed_days: default_seed_days(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventsConfig {
    /// Max number of change events buffered per subscriber (slow observers may lag).
    #[serde(default = "default_broadcast_capacity")]
    pub broadcast_capacity: usize,
}

fn default_broadcast_capacity() -> usize {
    64
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            broadcast_capacity: default_broadcast_capacity(),
        }
    }
}

impl AppConfig {
    /// Path from `CONFIG_FILE`, falling back to `config.toml`.
    pub fn path() -> String {
        std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into())
    }

    pub fn load() -> anyhow::Result<Self> {
        let s = std::fs::read_to_string(Self::path())?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.sequencer.tick_interval_ms > 0,
            "sequencer.tick_interval_ms must be > 0, got {}",
            self.sequencer.tick_interval_ms
        );
        anyhow::ensure!(
            self.sequencer.settle_delay_ms > 0,
            "sequencer.settle_delay_ms must be > 0, got {}",
            self.sequencer.settle_delay_ms
        );
        anyhow::ensure!(
            self.sequencer.power_on_flickers <= MAX_FLICKERS,
            "sequencer.power_on_flickers must be <= {}, got {}",
            MAX_FLICKERS,
            self.sequencer.power_on_flickers
        );
        anyhow::ensure!(
            self.sequencer.power_off_flickers <= MAX_FLICKERS,
            "sequencer.power_off_flickers must be <= {}, got {}",
            MAX_FLICKERS,
            self.sequencer.power_off_flickers
        );
        anyhow::ensure!(
            self.metrics.seed_days <= MAX_SEED_DAYS,
            "metrics.seed_days must be <= {}, got {}",
            MAX_SEED_DAYS,
            self.metrics.seed_days
        );
        anyhow::ensure!(
            self.events.broadcast_capacity > 0,
            "events.broadcast_capacity must be > 0, got {}",
            self.events.broadcast_capacity
        );
        Ok(())
    }
}
