// Per-day activity counters

use serde::{Deserialize, Serialize};

use super::DayKey;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayMetrics {
    pub breath_count: u32,
    pub step_count: u32,
    pub stair_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stand_minute: Option<u32>,
}

/// One row of the ordered store snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayEntry {
    pub day: DayKey,
    pub metrics: DayMetrics,
}
