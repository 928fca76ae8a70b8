//! Time-axis encoding for series containers.
//!
//! Container files store their time axis as an unsigned integer count of
//! elapsed units since a fixed epoch, tagged with a unit string of the form
//! `"<unit> since <epoch>"` (e.g. `"minutes since 1900-01-01 00:00:00"`).
//! [`TimeUnit`] parses and renders that string and converts between
//! timestamps and stored counts; [`TimeIndex`] carries the decoded
//! timestamps together with the timezone tag.
//!
//! Timestamps are always stored as naive wall-clock counts. A zone-aware
//! source index records its zone name in a separate `tz` attribute so the
//! reader can reconstruct the instants; a naive index records the sentinel
//! `"unknown"`.

use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDateTime, NaiveTime};
use thiserror::Error;

/// Sentinel zone tag for a timezone-naive time index.
pub const TZ_UNKNOWN: &str = "unknown";

/// Error type for time-axis encoding and decoding.
#[derive(Debug, Error)]
pub enum TimeError {
    /// Unit word not one of seconds/minutes/hours/days
    #[error("unsupported time unit '{0}' (expected seconds, minutes, hours or days)")]
    UnsupportedUnit(String),

    /// Unit string not of the form "<unit> since <epoch>"
    #[error("malformed time unit string '{0}' (expected '<unit> since <epoch>')")]
    MalformedUnits(String),

    /// Epoch timestamp could not be parsed
    #[error("unparseable epoch '{0}'")]
    BadEpoch(String),

    /// Timestamp earlier than the epoch cannot be stored as an unsigned count
    #[error("timestamp {timestamp} lies before the epoch {epoch}")]
    PreEpoch {
        timestamp: NaiveDateTime,
        epoch: NaiveDateTime,
    },

    /// Count does not fit the unsigned 32-bit time axis
    #[error("timestamp {0} does not fit the integer range of the time axis")]
    CountOverflow(NaiveDateTime),

    /// Decoded timestamp falls outside the representable datetime range
    #[error("count {0} decodes outside the representable datetime range")]
    DecodeOverflow(u32),
}

// =============================================================================
// TimeStep
// =============================================================================

/// Granularity of the stored time counts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeStep {
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeStep {
    /// Length of one step in seconds.
    #[inline]
    pub fn seconds(self) -> i64 {
        match self {
            TimeStep::Seconds => 1,
            TimeStep::Minutes => 60,
            TimeStep::Hours => 3_600,
            TimeStep::Days => 86_400,
        }
    }

    /// The unit word used in the units attribute.
    pub fn word(self) -> &'static str {
        match self {
            TimeStep::Seconds => "seconds",
            TimeStep::Minutes => "minutes",
            TimeStep::Hours => "hours",
            TimeStep::Days => "days",
        }
    }

    fn from_word(word: &str) -> Result<Self, TimeError> {
        match word {
            "seconds" | "second" => Ok(TimeStep::Seconds),
            "minutes" | "minute" => Ok(TimeStep::Minutes),
            "hours" | "hour" => Ok(TimeStep::Hours),
            "days" | "day" => Ok(TimeStep::Days),
            other => Err(TimeError::UnsupportedUnit(other.to_string())),
        }
    }
}

// =============================================================================
// TimeUnit
// =============================================================================

/// A time-axis encoding: a step granularity and its epoch.
///
/// Renders as `"<unit> since <epoch>"`, the exact string written to the
/// `units` attribute of the container's `time` variable.
///
/// # Example
///
/// ```
/// use res_rs::types::TimeUnit;
///
/// let unit: TimeUnit = "hours since 2015-01-01 00:00:00".parse().unwrap();
/// assert_eq!(unit.to_string(), "hours since 2015-01-01 00:00:00");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimeUnit {
    step: TimeStep,
    epoch: NaiveDateTime,
}

impl TimeUnit {
    /// Create a time unit from a step granularity and epoch.
    pub fn new(step: TimeStep, epoch: NaiveDateTime) -> Self {
        Self { step, epoch }
    }

    /// Parse a unit string of the form `"<unit> since <epoch>"`.
    ///
    /// The epoch accepts `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS`, or a
    /// bare `YYYY-MM-DD` (midnight).
    pub fn parse(s: &str) -> Result<Self, TimeError> {
        let (word, epoch_str) = s
            .split_once(" since ")
            .ok_or_else(|| TimeError::MalformedUnits(s.to_string()))?;
        let step = TimeStep::from_word(word.trim())?;
        let epoch = parse_epoch(epoch_str.trim())?;
        Ok(Self { step, epoch })
    }

    /// The step granularity.
    pub fn step(&self) -> TimeStep {
        self.step
    }

    /// The epoch timestamp.
    pub fn epoch(&self) -> NaiveDateTime {
        self.epoch
    }

    /// Convert timestamps to stored counts of this unit since the epoch.
    ///
    /// Timestamps finer than the step granularity truncate toward the epoch.
    ///
    /// # Errors
    /// - [`TimeError::PreEpoch`] for timestamps earlier than the epoch
    /// - [`TimeError::CountOverflow`] for counts beyond `u32::MAX`
    pub fn encode(&self, times: &[NaiveDateTime]) -> Result<Vec<u32>, TimeError> {
        let step_seconds = self.step.seconds();
        times
            .iter()
            .map(|&t| {
                let seconds = (t - self.epoch).num_seconds();
                if seconds < 0 {
                    return Err(TimeError::PreEpoch {
                        timestamp: t,
                        epoch: self.epoch,
                    });
                }
                u32::try_from(seconds / step_seconds).map_err(|_| TimeError::CountOverflow(t))
            })
            .collect()
    }

    /// Convert stored counts back to timestamps.
    pub fn decode(&self, counts: &[u32]) -> Result<Vec<NaiveDateTime>, TimeError> {
        let step_seconds = self.step.seconds();
        counts
            .iter()
            .map(|&c| {
                self.epoch
                    .checked_add_signed(Duration::seconds(c as i64 * step_seconds))
                    .ok_or(TimeError::DecodeOverflow(c))
            })
            .collect()
    }
}

impl Default for TimeUnit {
    /// The conventional container encoding: minutes since 1900-01-01.
    fn default() -> Self {
        Self {
            step: TimeStep::Minutes,
            epoch: chrono::NaiveDate::from_ymd_opt(1900, 1, 1)
                .map(|d| d.and_time(NaiveTime::MIN))
                .unwrap_or(NaiveDateTime::MIN),
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} since {}",
            self.step.word(),
            self.epoch.format("%Y-%m-%d %H:%M:%S")
        )
    }
}

impl FromStr for TimeUnit {
    type Err = TimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeUnit::parse(s)
    }
}

fn parse_epoch(s: &str) -> Result<NaiveDateTime, TimeError> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .or_else(|_| {
            chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").map(|d| d.and_time(NaiveTime::MIN))
        })
        .map_err(|_| TimeError::BadEpoch(s.to_string()))
}

// =============================================================================
// TimeIndex
// =============================================================================

/// The time axis of a series table: naive timestamps plus an optional zone
/// name.
///
/// Timestamps are wall-clock values. For a zone-aware source the zone name is
/// carried alongside (and written to the container's `tz` attribute) so the
/// original instants can be reconstructed by reapplying the zone; a naive
/// source carries no zone and is tagged [`TZ_UNKNOWN`] on disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimeIndex {
    timestamps: Vec<NaiveDateTime>,
    zone: Option<String>,
}

impl TimeIndex {
    /// Create a timezone-naive time index.
    pub fn naive(timestamps: Vec<NaiveDateTime>) -> Self {
        Self {
            timestamps,
            zone: None,
        }
    }

    /// Create a time index of wall-clock timestamps in a named zone.
    pub fn zoned(timestamps: Vec<NaiveDateTime>, zone: impl Into<String>) -> Self {
        Self {
            timestamps,
            zone: Some(zone.into()),
        }
    }

    /// Reconstruct a time index from timestamps and an on-disk zone tag.
    ///
    /// The tag [`TZ_UNKNOWN`] maps back to a naive index.
    pub fn from_tag(timestamps: Vec<NaiveDateTime>, tag: &str) -> Self {
        if tag == TZ_UNKNOWN {
            Self::naive(timestamps)
        } else {
            Self::zoned(timestamps, tag)
        }
    }

    /// Build an hourly index of `n` steps starting at `start`.
    pub fn hourly(start: NaiveDateTime, n: usize) -> Self {
        let timestamps = (0..n)
            .map(|i| start + Duration::hours(i as i64))
            .collect();
        Self::naive(timestamps)
    }

    /// Number of timestamps.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// The timestamps as wall-clock values.
    pub fn timestamps(&self) -> &[NaiveDateTime] {
        &self.timestamps
    }

    /// The zone name, if the source index was zone-aware.
    pub fn zone(&self) -> Option<&str> {
        self.zone.as_deref()
    }

    /// The zone tag written to disk: the zone name, or [`TZ_UNKNOWN`].
    pub fn tz_tag(&self) -> &str {
        self.zone.as_deref().unwrap_or(TZ_UNKNOWN)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(y: i32, mo: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_parse_and_display_roundtrip() {
        let unit = TimeUnit::parse("minutes since 1900-01-01 00:00:00").unwrap();
        assert_eq!(unit.step(), TimeStep::Minutes);
        assert_eq!(unit.to_string(), "minutes since 1900-01-01 00:00:00");

        let unit2: TimeUnit = unit.to_string().parse().unwrap();
        assert_eq!(unit, unit2);
    }

    #[test]
    fn test_parse_date_only_epoch() {
        let unit = TimeUnit::parse("hours since 2015-01-01").unwrap();
        assert_eq!(unit.epoch(), ts(2015, 1, 1, 0));
    }

    #[test]
    fn test_parse_rejects_unknown_unit() {
        let result = TimeUnit::parse("fortnights since 1900-01-01");
        assert!(matches!(result, Err(TimeError::UnsupportedUnit(_))));
    }

    #[test]
    fn test_parse_rejects_missing_since() {
        let result = TimeUnit::parse("minutes 1900-01-01");
        assert!(matches!(result, Err(TimeError::MalformedUnits(_))));
    }

    #[test]
    fn test_parse_rejects_bad_epoch() {
        let result = TimeUnit::parse("minutes since yesterday");
        assert!(matches!(result, Err(TimeError::BadEpoch(_))));
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let unit = TimeUnit::new(TimeStep::Hours, ts(2015, 1, 1, 0));
        let times: Vec<_> = (0..48).map(|i| ts(2015, 1, 1, 0) + Duration::hours(i)).collect();

        let counts = unit.encode(&times).unwrap();
        assert_eq!(counts[0], 0);
        assert_eq!(counts[47], 47);

        let decoded = unit.decode(&counts).unwrap();
        assert_eq!(decoded, times);
    }

    #[test]
    fn test_encode_default_unit() {
        let unit = TimeUnit::default();
        let counts = unit.encode(&[ts(1900, 1, 1, 1)]).unwrap();
        assert_eq!(counts[0], 60);
    }

    #[test]
    fn test_encode_truncates_sub_unit() {
        let unit = TimeUnit::new(TimeStep::Hours, ts(2015, 1, 1, 0));
        let t = ts(2015, 1, 1, 0) + Duration::minutes(90);
        let counts = unit.encode(&[t]).unwrap();
        assert_eq!(counts[0], 1);
    }

    #[test]
    fn test_encode_rejects_pre_epoch() {
        let unit = TimeUnit::new(TimeStep::Hours, ts(2015, 1, 1, 0));
        let result = unit.encode(&[ts(2014, 12, 31, 23)]);
        assert!(matches!(result, Err(TimeError::PreEpoch { .. })));
    }

    #[test]
    fn test_time_index_tags() {
        let naive = TimeIndex::naive(vec![ts(2015, 1, 1, 0)]);
        assert_eq!(naive.tz_tag(), TZ_UNKNOWN);
        assert!(naive.zone().is_none());

        let zoned = TimeIndex::zoned(vec![ts(2015, 1, 1, 0)], "CET");
        assert_eq!(zoned.tz_tag(), "CET");
        assert_eq!(zoned.zone(), Some("CET"));

        assert_eq!(
            TimeIndex::from_tag(vec![ts(2015, 1, 1, 0)], TZ_UNKNOWN),
            naive
        );
        assert_eq!(TimeIndex::from_tag(vec![ts(2015, 1, 1, 0)], "CET"), zoned);
    }

    #[test]
    fn test_hourly_index() {
        let index = TimeIndex::hourly(ts(2015, 6, 1, 0), 24);
        assert_eq!(index.len(), 24);
        assert_eq!(index.timestamps()[23], ts(2015, 6, 1, 23));
    }
}
