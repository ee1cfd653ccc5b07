// Calendar day key: days since 1970-01-01, independent of time zone

use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// `NaiveDate::num_days_from_ce` of 1970-01-01.
const EPOCH_DAYS_FROM_CE: i32 = 719_163;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Canonical identifier for a calendar day. Two lookups for "today" within the
/// same local day always produce the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DayKey(i32);

impl DayKey {
    pub fn from_days(days_since_epoch: i32) -> Self {
        Self(days_since_epoch)
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self(date.num_days_from_ce() - EPOCH_DAYS_FROM_CE)
    }

    /// The local calendar day, normalized to midnight.
    pub fn today() -> Self {
        Self::from_date(Local::now().date_naive())
    }

    pub fn days_since_epoch(self) -> i32 {
        self.0
    }

    /// None when the day number lies outside chrono's supported range.
    pub fn date(self) -> Option<NaiveDate> {
        self.0
            .checked_add(EPOCH_DAYS_FROM_CE)
            .and_then(NaiveDate::from_num_days_from_ce_opt)
    }

    /// The key `days` calendar days before this one.
    pub fn previous(self, days: u32) -> Self {
        let days = i32::try_from(days).unwrap_or(i32::MAX);
        Self(self.0.saturating_sub(days))
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.date() {
            Some(date) => write!(f, "{}", date.format(DATE_FORMAT)),
            None => write!(f, "day#{}", self.0),
        }
    }
}

impl FromStr for DayKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s, DATE_FORMAT)
            .map(Self::from_date)
            .map_err(|e| Error::InvalidArgument(format!("day key {s:?}: {e}")))
    }
}

impl TryFrom<String> for DayKey {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<DayKey> for String {
    fn from(key: DayKey) -> Self {
        key.to_string()
    }
}
