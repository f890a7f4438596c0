//! Gaming-day clock.
//!
//! A casino day does not end at midnight: play past midnight still belongs
//! to the previous gaming day until the cutoff. The clock maps a UTC instant
//! to the gaming date it is booked against.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, Utc};
use chrono_tz::Tz;

use crate::LedgerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GamingDayClock {
    tz: Tz,
    cutoff: NaiveTime,
}

impl Default for GamingDayClock {
    fn default() -> Self {
        Self {
            tz: Tz::UTC,
            cutoff: NaiveTime::MIN,
        }
    }
}

impl GamingDayClock {
    pub fn new(tz: Tz, cutoff: NaiveTime) -> Self {
        Self { tz, cutoff }
    }

    /// Parse an IANA zone name (`"America/Los_Angeles"`) and an `HH:MM` cutoff.
    pub fn parse(tz: &str, cutoff: &str) -> Result<Self, LedgerError> {
        let tz: Tz = tz
            .trim()
            .parse()
            .map_err(|_| LedgerError::InvalidClock(format!("unknown time zone {tz:?}")))?;
        let cutoff = NaiveTime::parse_from_str(cutoff.trim(), "%H:%M")
            .map_err(|_| LedgerError::InvalidClock(format!("cutoff {cutoff:?} is not HH:MM")))?;
        Ok(Self { tz, cutoff })
    }

    pub fn tz(&self) -> Tz {
        self.tz
    }

    pub fn cutoff(&self) -> NaiveTime {
        self.cutoff
    }

    /// Gaming date an instant is booked against.
    pub fn gaming_date(&self, at: DateTime<Utc>) -> NaiveDate {
        let local = at.with_timezone(&self.tz).naive_local();
        let since_midnight: TimeDelta = self.cutoff.signed_duration_since(NaiveTime::MIN);
        (local - since_midnight).date()
    }
}
