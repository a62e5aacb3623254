use crate::error::{AnalyticsError, Result};
use crate::utils::date::{format_date, parse_date};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Trailing window presets, resolved against an end date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeRange {
    #[serde(rename = "1W")]
    OneWeek,
    #[serde(rename = "2W")]
    TwoWeeks,
    #[serde(rename = "1M")]
    OneMonth,
    #[serde(rename = "3M")]
    ThreeMonths,
    #[serde(rename = "6M")]
    SixMonths,
    #[serde(rename = "1Y")]
    OneYear,
    #[serde(rename = "2Y")]
    TwoYears,
}

impl TimeRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::OneWeek => "1W",
            TimeRange::TwoWeeks => "2W",
            TimeRange::OneMonth => "1M",
            TimeRange::ThreeMonths => "3M",
            TimeRange::SixMonths => "6M",
            TimeRange::OneYear => "1Y",
            TimeRange::TwoYears => "2Y",
        }
    }

    /// Calendar days covered by the preset.
    pub fn days(&self) -> i64 {
        match self {
            TimeRange::OneWeek => 7,
            TimeRange::TwoWeeks => 14,
            TimeRange::OneMonth => 30,
            TimeRange::ThreeMonths => 90,
            TimeRange::SixMonths => 182,
            TimeRange::OneYear => 365,
            TimeRange::TwoYears => 730,
        }
    }

    pub fn ending_on(&self, end: NaiveDate) -> DateRange {
        DateRange::trailing(end, self.days())
    }
}

impl FromStr for TimeRange {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "1W" => Ok(TimeRange::OneWeek),
            "2W" => Ok(TimeRange::TwoWeeks),
            "1M" => Ok(TimeRange::OneMonth),
            "3M" => Ok(TimeRange::ThreeMonths),
            "6M" => Ok(TimeRange::SixMonths),
            "1Y" => Ok(TimeRange::OneYear),
            "2Y" => Ok(TimeRange::TwoYears),
            other => Err(AnalyticsError::InvalidRange(format!("unknown range preset {:?}", other))),
        }
    }
}

/// Inclusive calendar-date window `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(AnalyticsError::InvalidRange(format!(
                "start_date {} is after end_date {}",
                format_date(start),
                format_date(end)
            )));
        }
        Ok(Self { start, end })
    }

    /// Parse `YYYY-MM-DD` bounds.
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        let start = parse_date(start)
            .map_err(|e| AnalyticsError::InvalidRange(format!("start_date {:?}: {}", start, e)))?;
        let end = parse_date(end)
            .map_err(|e| AnalyticsError::InvalidRange(format!("end_date {:?}: {}", end, e)))?;
        Self::new(start, end)
    }

    /// `[end - days, end]`.
    pub fn trailing(end: NaiveDate, days: i64) -> Self {
        Self {
            start: end - Duration::days(days.max(0)),
            end,
        }
    }

    /// Resolve optional query bounds. Unless both are given, the range is a
    /// trailing window of `default_days` ending `today`. A lone bound is ignored.
    pub fn from_query(
        start: Option<&str>,
        end: Option<&str>,
        today: NaiveDate,
        default_days: i64,
    ) -> Result<Self> {
        let start = start.map(str::trim).filter(|s| !s.is_empty());
        let end = end.map(str::trim).filter(|s| !s.is_empty());

        match (start, end) {
            (Some(start), Some(end)) => Self::parse(start, end),
            (None, None) => Ok(Self::trailing(today, default_days)),
            (start, end) => {
                debug!(
                    ?start,
                    ?end,
                    default_days,
                    "Only one date bound given, using trailing window"
                );
                Ok(Self::trailing(today, default_days))
            }
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", format_date(self.start), format_date(self.end))
    }
}
