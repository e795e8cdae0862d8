//! Grounding context and resolution options.

use chrono::{DateTime, NaiveDateTime, Utc};
use chrono_tz::Tz;

use crate::calendar::{self, Instant, TimeObject, WeekStartDay};
use crate::error::TimeError;
use crate::grain::Grain;

/// Options for building a [`TimeContext`] and resolving values against it.
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// Which day starts the week for week-grain rounding.
    pub week_start: WeekStartDay,
    /// How many years before and after the reference time sequences may reach.
    pub horizon_years: u32,
    /// Whether latent (ambiguous) values resolve at all.
    pub with_latent: bool,
    /// How many alternative occurrences a resolution reports.
    pub max_values: usize,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        ResolveOptions {
            week_start: WeekStartDay::default(),
            horizon_years: 2000,
            with_latent: false,
            max_values: 3,
        }
    }
}

/// The reference frame every predicate is grounded against.
///
/// No occurrence outside `[min_time, max_time]` is ever produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeContext {
    /// The reference instant, as a one-second value in local wall-clock time.
    pub reference: TimeObject,
    /// The active timezone the reference is expressed in.
    pub timezone: Tz,
    pub min_time: Instant,
    pub max_time: Instant,
    pub week_start: WeekStartDay,
    /// The full horizon; `min_time`/`max_time` may be a narrower window of it.
    horizon: (Instant, Instant),
}

impl TimeContext {
    /// Build a context around a UTC reference instant viewed in `timezone`.
    pub fn new(reference: DateTime<Utc>, timezone: Tz, options: &ResolveOptions) -> Self {
        let local = reference.with_timezone(&timezone).naive_local();
        TimeContext::from_local(local, timezone, options)
    }

    /// Build a context around a wall-clock instant already local to `timezone`.
    pub fn from_local(reference: Instant, timezone: Tz, options: &ResolveOptions) -> Self {
        let reference = calendar::round(reference, Grain::Second, options.week_start);
        let years = i64::from(options.horizon_years);
        let min_time = calendar::add(reference, Grain::Year, -years).unwrap_or(NaiveDateTime::MIN);
        let max_time = calendar::add(reference, Grain::Year, years).unwrap_or(NaiveDateTime::MAX);
        TimeContext {
            reference: TimeObject::new(reference, Grain::Second),
            timezone,
            min_time,
            max_time,
            week_start: options.week_start,
            horizon: (min_time, max_time),
        }
    }

    /// Parse an RFC 3339 reference and an IANA timezone name.
    ///
    /// # Errors
    ///
    /// Returns [`TimeError::InvalidDatetime`] if the reference cannot be parsed,
    /// or [`TimeError::InvalidTimezone`] if the timezone is unknown.
    pub fn from_rfc3339(
        reference: &str,
        timezone: &str,
        options: &ResolveOptions,
    ) -> Result<Self, TimeError> {
        let dt = DateTime::parse_from_rfc3339(reference)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| TimeError::InvalidDatetime(format!("'{}': {}", reference, e)))?;
        let tz = calendar::parse_timezone(timezone)?;
        Ok(TimeContext::new(dt, tz, options))
    }

    /// Replace the sequence horizon.
    ///
    /// # Errors
    ///
    /// Returns [`TimeError::InvalidHorizon`] if `min_time` is after `max_time`.
    pub fn with_horizon(self, min_time: Instant, max_time: Instant) -> Result<Self, TimeError> {
        if min_time > max_time {
            return Err(TimeError::InvalidHorizon(format!(
                "min_time ({}) must be <= max_time ({})",
                min_time, max_time
            )));
        }
        Ok(TimeContext {
            min_time,
            max_time,
            horizon: (min_time, max_time),
            ..self
        })
    }

    /// The same context with its horizon clamped to `[min_time, max_time]`.
    pub(crate) fn narrowed(&self, min_time: Instant, max_time: Instant) -> Self {
        TimeContext {
            min_time: self.min_time.max(min_time),
            max_time: self.max_time.min(max_time),
            ..*self
        }
    }

    /// The same context with the window reopened to the full horizon.
    ///
    /// Derived values (shifted, mapped, interval-building) may come from base
    /// occurrences outside the current window, so their bases are grounded
    /// against this.
    pub(crate) fn widened(&self) -> Self {
        TimeContext {
            min_time: self.horizon.0,
            max_time: self.horizon.1,
            ..*self
        }
    }

    /// Whether a future-bound value still starts inside the horizon.
    pub(crate) fn reaches(&self, t: &TimeObject) -> bool {
        t.start < self.max_time
    }

    /// Whether a past-bound value still ends inside the horizon.
    pub(crate) fn recalls(&self, t: &TimeObject) -> bool {
        t.end_instant() > self.min_time
    }
}
