//! Calendar primitives the predicate algebra is built on.
//!
//! Instants are local wall-clock values ([`NaiveDateTime`]) in the timezone
//! of the active [`TimeContext`](crate::context::TimeContext). Rounding and
//! stepping are plain calendar arithmetic; timezone offsets only matter when
//! a value is shifted between zones or rendered for output.
//!
//! # Functions
//!
//! - [`round`] — floor an instant to a grain boundary
//! - [`add`] — shift an instant by whole grains, clipping month ends
//! - [`sequence`] — past/future streams stepping from an aligned start
//! - [`active_offset`] — UTC offset (minutes) of a timezone at a local instant
//! - [`resolve_timezone_name`] / [`parse_timezone`] — textual timezone lookup

use chrono::{
    Datelike, Days, LocalResult, Months, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeDelta,
    TimeZone, Timelike, Weekday,
};
use chrono_tz::Tz;
use serde::Serialize;

use crate::error::TimeError;
use crate::grain::Grain;

/// A local wall-clock instant.
pub type Instant = NaiveDateTime;

// ── Week start ──────────────────────────────────────────────────────────────

/// Which day begins a week when rounding to [`Grain::Week`].
///
/// Does **not** affect day-of-week values like "Monday" or "Friday".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum WeekStartDay {
    /// ISO 8601 standard (Monday = day 0 of the week).
    #[default]
    Monday,
    /// US/Canada convention (Sunday = day 0 of the week).
    Sunday,
}

/// How many days `weekday` is from the week-start day.
fn days_from_week_start(weekday: Weekday, week_start: WeekStartDay) -> u64 {
    match week_start {
        WeekStartDay::Monday => weekday.num_days_from_monday() as u64,
        WeekStartDay::Sunday => weekday.num_days_from_sunday() as u64,
    }
}

// ── Instant arithmetic ──────────────────────────────────────────────────────

/// Floor `t` to the start of its enclosing `grain`.
pub fn round(t: Instant, grain: Grain, week_start: WeekStartDay) -> Instant {
    let date = t.date();
    match grain {
        Grain::Second => t - TimeDelta::nanoseconds(t.nanosecond() as i64),
        Grain::Minute => {
            date.and_time(NaiveTime::MIN) + TimeDelta::minutes((t.hour() * 60 + t.minute()) as i64)
        }
        Grain::Hour => date.and_time(NaiveTime::MIN) + TimeDelta::hours(t.hour() as i64),
        Grain::Day => date.and_time(NaiveTime::MIN),
        Grain::Week => {
            let back = days_from_week_start(date.weekday(), week_start);
            days_back(date, back).and_time(NaiveTime::MIN)
        }
        Grain::Month => days_back(date, date.day0() as u64).and_time(NaiveTime::MIN),
        Grain::Quarter => {
            let first = days_back(date, date.day0() as u64);
            first
                .checked_sub_months(Months::new(date.month0() % 3))
                .unwrap_or(NaiveDate::MIN)
                .and_time(NaiveTime::MIN)
        }
        Grain::Year => days_back(date, date.ordinal0() as u64).and_time(NaiveTime::MIN),
    }
}

/// `date` moved back `n` days, clamped at the earliest representable date.
fn days_back(date: NaiveDate, n: u64) -> NaiveDate {
    date.checked_sub_days(Days::new(n)).unwrap_or(NaiveDate::MIN)
}

/// Shift `t` by `n` whole grains.
///
/// Month-based grains clip to the last valid day of the target month
/// (Jan 31 + 1 month = Feb 28/29). Returns `None` on overflow.
pub fn add(t: Instant, grain: Grain, n: i64) -> Option<Instant> {
    match grain {
        Grain::Second => t.checked_add_signed(TimeDelta::try_seconds(n)?),
        Grain::Minute => t.checked_add_signed(TimeDelta::try_minutes(n)?),
        Grain::Hour => t.checked_add_signed(TimeDelta::try_hours(n)?),
        Grain::Day => t.checked_add_signed(TimeDelta::try_days(n)?),
        Grain::Week => t.checked_add_signed(TimeDelta::try_weeks(n)?),
        Grain::Month => add_months(t, n),
        Grain::Quarter => add_months(t, n.checked_mul(3)?),
        Grain::Year => add_months(t, n.checked_mul(12)?),
    }
}

fn add_months(t: Instant, n: i64) -> Option<Instant> {
    let months = Months::new(u32::try_from(n.unsigned_abs()).ok()?);
    if n >= 0 {
        t.checked_add_months(months)
    } else {
        t.checked_sub_months(months)
    }
}

// ── TimeObject ──────────────────────────────────────────────────────────────

/// How the far end of an interval is taken from its end occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum IntervalType {
    /// Ends where the end occurrence starts.
    Open,
    /// Ends where the end occurrence ends.
    Closed,
}

/// A grounded calendar value: a grain-sized point, or an explicit span
/// `[start, end)` when `end` is present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeObject {
    pub start: Instant,
    pub end: Option<Instant>,
    pub grain: Grain,
}

impl TimeObject {
    /// A point covering one `grain` starting at `start`.
    pub fn new(start: Instant, grain: Grain) -> Self {
        TimeObject {
            start,
            end: None,
            grain,
        }
    }

    /// An explicit span; `None` unless `end > start`.
    pub fn span(start: Instant, end: Instant, grain: Grain) -> Option<Self> {
        (end > start).then_some(TimeObject {
            start,
            end: Some(end),
            grain,
        })
    }

    /// The exclusive end: the explicit end, or `start` plus one grain.
    pub fn end_instant(&self) -> Instant {
        self.end
            .or_else(|| add(self.start, self.grain, 1))
            .unwrap_or(NaiveDateTime::MAX)
    }

    /// This value's start floored to `grain`; the explicit end is dropped.
    pub fn round(&self, grain: Grain, week_start: WeekStartDay) -> Self {
        TimeObject::new(round(self.start, grain, week_start), grain)
    }

    /// Shift the start by `n` grains. The grain becomes the finer of the
    /// two; an explicit end is kept only while it still follows the start.
    pub fn plus(&self, grain: Grain, n: i64) -> Option<Self> {
        let start = add(self.start, grain, n)?;
        Some(TimeObject {
            start,
            end: self.end.filter(|end| *end > start),
            grain: self.grain.min(grain),
        })
    }

    /// The overlap of two values, if any.
    ///
    /// When one value lies entirely inside the other, the inner value is
    /// returned unchanged so it keeps its own grain and shape.
    pub fn intersect(&self, other: &TimeObject) -> Option<TimeObject> {
        let (s1, e1) = (self.start, self.end_instant());
        let (s2, e2) = (other.start, other.end_instant());
        if s1 >= e2 || s2 >= e1 {
            return None;
        }
        if s1 <= s2 && e2 <= e1 {
            return Some(*other);
        }
        if s2 <= s1 && e1 <= e2 {
            return Some(*self);
        }
        TimeObject::span(s1.max(s2), e1.min(e2), self.grain.min(other.grain))
    }

    /// Whether this value starts before `other` ends.
    pub fn starts_before_end_of(&self, other: &TimeObject) -> bool {
        self.start < other.end_instant()
    }

    /// Whether this value starts strictly before `other` starts.
    pub fn before(&self, other: &TimeObject) -> bool {
        self.start < other.start
    }

    /// A one-second point placed where this value ends.
    pub fn starting_at_end_of(&self) -> TimeObject {
        TimeObject::new(self.end_instant(), Grain::Second)
    }
}

/// Build an interval from the start of `from` to `to`.
///
/// `None` when the resulting end would not follow the start.
pub fn build_interval(kind: IntervalType, from: &TimeObject, to: &TimeObject) -> Option<TimeObject> {
    let end = match kind {
        IntervalType::Open => to.start,
        IntervalType::Closed => to.end_instant(),
    };
    TimeObject::span(from.start, end, from.grain.min(to.grain))
}

/// Stream `step`-grain apart values from an aligned `start`.
///
/// `future` begins with `start` itself; `past` begins one step before it
/// and walks backwards. Both end only at calendar overflow, so callers bound
/// them by a horizon.
pub fn sequence(
    grain: Grain,
    step: i64,
    start: TimeObject,
) -> (
    impl Iterator<Item = TimeObject> + Send,
    impl Iterator<Item = TimeObject> + Send,
) {
    let past = std::iter::successors(start.plus(grain, -step), move |t| t.plus(grain, -step));
    let future = std::iter::successors(Some(start), move |t| t.plus(grain, step));
    (past, future)
}

// ── Timezones ───────────────────────────────────────────────────────────────

/// UTC offset in minutes of `tz` at the local wall-clock `instant`.
///
/// Ambiguous local times (fall-back) take the earlier mapping. Local times
/// inside a spring-forward gap are read as UTC to pick an offset.
pub fn active_offset(tz: &Tz, instant: Instant) -> i32 {
    let offset = match tz.offset_from_local_datetime(&instant) {
        LocalResult::Single(offset) | LocalResult::Ambiguous(offset, _) => offset,
        LocalResult::None => tz.offset_from_utc_datetime(&instant),
    };
    offset.fix().local_minus_utc() / 60
}

/// Look up a timezone by IANA name or tzdb abbreviation zone, ignoring case.
pub fn resolve_timezone_name(text: &str) -> Option<Tz> {
    let name = text.trim();
    if name.is_empty() {
        return None;
    }
    name.parse::<Tz>().ok().or_else(|| {
        chrono_tz::TZ_VARIANTS
            .iter()
            .find(|tz| tz.name().eq_ignore_ascii_case(name))
            .copied()
    })
}

/// Parse a timezone string into `Tz`.
pub fn parse_timezone(s: &str) -> Result<Tz, TimeError> {
    resolve_timezone_name(s).ok_or_else(|| TimeError::InvalidTimezone(format!("'{}'", s)))
}

// ── Tests ───────────────────────────────────────────────────────────────────
