//! Typed date inputs in front of a [`DateRangeRefinement`](super::DateRangeRefinement).
//!
//! Keystrokes are debounced. When the quiet period elapses both fields are parsed; an empty field
//! commits an open bound, and a malformed field suppresses the whole commit so the widget keeps its
//! last valid range.

use std::time::Duration;

use common::timestamp_boundary::{Timestamp, TimezoneMode, clamp_year_digits, is_date_shaped};
use tokio::time::Instant;

use super::date_range::{DateRange, DateRangeRenderState};
use crate::debounce::Debouncer;


#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RangeField {
    Start,
    End,
}

#[derive(Debug)]
pub struct DateRangeInput {
    timezone: TimezoneMode,
    start_text: String,
    end_text: String,
    debouncer: Debouncer<()>,
}

impl DateRangeInput {
    pub fn new(timezone: TimezoneMode, quiet_period: Duration) -> Self {
        Self { timezone, start_text: String::new(), end_text: String::new(), debouncer: Debouncer::new(quiet_period) }
    }

    pub fn text(&self, field: RangeField) -> &str {
        match field {
            RangeField::Start => &self.start_text,
            RangeField::End => &self.end_text,
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    /// Records a keystroke and returns the text the input should show, which differs from `text`
    /// when an overlong year had to be cut back to four digits.
    pub fn on_input(&mut self, field: RangeField, text: &str, now: Instant) -> String {
        let text = clamp_year_digits(text).unwrap_or_else(|| text.to_string());
        match field {
            RangeField::Start => self.start_text = text.clone(),
            RangeField::End => self.end_text = text.clone(),
        }
        self.debouncer.push((), now);
        text
    }

    /// Shows the committed range unless the user is still typing.
    pub fn sync_from(&mut self, state: &DateRangeRenderState) {
        if self.debouncer.is_pending() {
            return;
        }
        self.start_text = state.start_date.clone().unwrap_or_default();
        self.end_text = state.end_date.clone().unwrap_or_default();
    }

    /// Range to commit once the quiet period is over, if both fields are acceptable.
    pub fn poll(&mut self, now: Instant) -> Option<DateRange> {
        self.debouncer.take_due(now)?;
        self.parse()
    }

    /// Polls and hands a due, valid range to `refine`. Returns whether a commit happened.
    pub fn commit_due(&mut self, now: Instant, refine: &dyn Fn(DateRange)) -> bool {
        match self.poll(now) {
            Some(range) => {
                refine(range);
                true
            }
            None => false,
        }
    }

    fn parse(&self) -> Option<DateRange> {
        let start = self.parse_field(RangeField::Start)?;
        let end = self.parse_field(RangeField::End)?;
        Some(DateRange::new(start, end))
    }

    /// `Some(None)` for an empty field, `None` for a malformed one.
    fn parse_field(&self, field: RangeField) -> Option<Option<Timestamp>> {
        let text = self.text(field).trim();
        if text.is_empty() {
            return Some(None);
        }
        if !is_date_shaped(text) {
            tracing::debug!("Suppressing commit of malformed date {:?}", text);
            return None;
        }
        let parsed = match field {
            RangeField::Start => self.timezone.start_of_day(text),
            RangeField::End => self.timezone.end_of_day(text),
        };
        match parsed {
            Ok(timestamp) => Some(Some(timestamp)),
            Err(e) => {
                tracing::debug!("Suppressing commit: {}", e);
                None
            }
        }
    }
}
