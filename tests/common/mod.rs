// Shared test helpers

#![allow(dead_code)]

use fitbelt::device_status::{DeviceStatus, SequenceTiming};
use fitbelt::models::{DayMetrics, DeviceState};
use tokio::sync::broadcast;

pub fn metrics(breath_count: u32, step_count: u32, stair_count: u32) -> DayMetrics {
    DayMetrics {
        breath_count,
        step_count,
        stair_count,
        stand_minute: None,
    }
}

/// Default 500ms timing, 5 flickers on, 2 flickers off.
pub fn device() -> DeviceStatus {
    DeviceStatus::new(SequenceTiming::default(), 64).unwrap()
}

/// Everything currently buffered on the receiver.
pub fn drain(rx: &mut broadcast::Receiver<DeviceState>) -> Vec<DeviceState> {
    let mut out = Vec::new();
    while let Ok(state) = rx.try_recv() {
        out.push(state);
    }
    out
}
