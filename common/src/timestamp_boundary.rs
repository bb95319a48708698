//! Calendar day boundaries as whole Unix seconds, in local time or UTC.
//!
//! A caller picks one [`TimezoneMode`] per attribute and uses it in both directions; mixing a
//! local boundary with a UTC inverse is not detected here.

use std::sync::LazyLock;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::search_const::DATE_FORMAT;

/// Seconds since the Unix epoch.
pub type Timestamp = i64;

static DATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimezoneMode {
    #[default]
    Local,
    Utc,
}

impl TimezoneMode {
    pub fn start_of_day(self, date: &str) -> Result<Timestamp> {
        match self {
            TimezoneMode::Local => start_of_day_local(date),
            TimezoneMode::Utc => start_of_day_utc(date),
        }
    }

    pub fn end_of_day(self, date: &str) -> Result<Timestamp> {
        match self {
            TimezoneMode::Local => end_of_day_local(date),
            TimezoneMode::Utc => end_of_day_utc(date),
        }
    }

    pub fn date_string(self, timestamp: Timestamp) -> Result<String> {
        match self {
            TimezoneMode::Local => date_string_local(timestamp),
            TimezoneMode::Utc => date_string_utc(timestamp),
        }
    }
}

/// True if `input` has the exact `YYYY-MM-DD` shape. Says nothing about the calendar.
pub fn is_date_shaped(input: &str) -> bool {
    DATE_PATTERN.is_match(input)
}

pub fn parse_date(input: &str) -> Result<NaiveDate> {
    if !is_date_shaped(input) {
        return Err(Error::InvalidDate { input: input.to_string() });
    }
    NaiveDate::parse_from_str(input, DATE_FORMAT).map_err(|_| Error::InvalidDate { input: input.to_string() })
}

fn end_of_day_time() -> NaiveTime {
    NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN)
}

fn local_timestamp(date_time: NaiveDateTime) -> Timestamp {
    match Local.from_local_datetime(&date_time).earliest() {
        Some(local) => local.timestamp(),
        // the wall-clock time falls into a DST gap; the day starts when the clocks jump
        None => Local
            .from_local_datetime(&(date_time + chrono::Duration::hours(1)))
            .earliest()
            .map_or_else(|| date_time.and_utc().timestamp(), |local| local.timestamp()),
    }
}

pub fn start_of_day_local(date: &str) -> Result<Timestamp> {
    let date = parse_date(date)?;
    Ok(local_timestamp(date.and_time(NaiveTime::MIN)))
}

pub fn end_of_day_local(date: &str) -> Result<Timestamp> {
    let date = parse_date(date)?;
    Ok(local_timestamp(date.and_time(end_of_day_time())))
}

pub fn start_of_day_utc(date: &str) -> Result<Timestamp> {
    let date = parse_date(date)?;
    Ok(date.and_time(NaiveTime::MIN).and_utc().timestamp())
}

/// `23:59:59.999` truncated to whole seconds.
pub fn end_of_day_utc(date: &str) -> Result<Timestamp> {
    let date = parse_date(date)?;
    Ok(date.and_time(end_of_day_time()).and_utc().timestamp())
}

pub fn date_string_local(timestamp: Timestamp) -> Result<String> {
    let local = Local
        .timestamp_opt(timestamp, 0)
        .single()
        .ok_or(Error::TimestampOutOfRange { timestamp })?;
    Ok(local.format(DATE_FORMAT).to_string())
}

pub fn date_string_utc(timestamp: Timestamp) -> Result<String> {
    let utc: DateTime<Utc> = DateTime::from_timestamp(timestamp, 0).ok_or(Error::TimestampOutOfRange { timestamp })?;
    Ok(utc.format(DATE_FORMAT).to_string())
}

/// Cuts the year of a typed date back to four digits, e.g. `20245-01-31` becomes `2024-01-31`.
/// Returns `None` when nothing had to change.
pub fn clamp_year_digits(input: &str) -> Option<String> {
    let (year, rest) = input.split_once('-')?;
    if year.len() <= 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(format!("{}-{rest}", &year[..4]))
}
