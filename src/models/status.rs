// Device connection status and the observable device state

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Connection indicator shown next to the device. The two connecting phases
/// alternate while the device is searching for a signal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectionStatus {
    #[default]
    #[serde(rename = "wifi-off")]
    Off,
    #[serde(rename = "wifi-1")]
    ConnectingPhaseA,
    #[serde(rename = "wifi-2")]
    ConnectingPhaseB,
    #[serde(rename = "wifi")]
    Connected,
}

impl ConnectionStatus {
    pub const ALL: [ConnectionStatus; 4] = [
        ConnectionStatus::Off,
        ConnectionStatus::ConnectingPhaseA,
        ConnectionStatus::ConnectingPhaseB,
        ConnectionStatus::Connected,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ConnectionStatus::Off => "wifi-off",
            ConnectionStatus::ConnectingPhaseA => "wifi-1",
            ConnectionStatus::ConnectingPhaseB => "wifi-2",
            ConnectionStatus::Connected => "wifi",
        }
    }

    pub fn is_connecting(self) -> bool {
        matches!(
            self,
            ConnectionStatus::ConnectingPhaseA | ConnectionStatus::ConnectingPhaseB
        )
    }

    /// The other connecting phase. Anything that is not phase A flips to phase A.
    pub fn flicker(self) -> Self {
        match self {
            ConnectionStatus::ConnectingPhaseA => ConnectionStatus::ConnectingPhaseB,
            _ => ConnectionStatus::ConnectingPhaseA,
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ConnectionStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.label() == s)
            .ok_or_else(|| Error::InvalidArgument(format!("unknown connection status {s:?}")))
    }
}

/// Snapshot of the device as seen by observers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceState {
    pub powered_on: bool,
    pub status: ConnectionStatus,
}
