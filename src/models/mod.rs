// Domain models shared by the metrics store and the device status sequencer

mod day;
mod metrics;
mod status;

pub use day::DayKey;
pub use metrics::{DayEntry, DayMetrics};
pub use status::{ConnectionStatus, DeviceState};
