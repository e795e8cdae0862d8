//! Point predicates: fixed calendar fields such as "3pm", "the 13th" or "March".
//!
//! Each occurrence is computed directly from an aligned slot, never found by
//! filtering a finer cycle, so sparse fields cost one step per slot.

use chrono::{Datelike, NaiveDate, NaiveTime};

use crate::calendar::{self, TimeObject, WeekStartDay};
use crate::context::TimeContext;
use crate::grain::Grain;
use crate::predicate::{rebucket, Predicate, Series};

/// A calendar field pinned to a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// Second of the minute, 0-59.
    Second(u32),
    /// Minute of the hour, 0-59.
    Minute(u32),
    /// Hour of the day. In 12-hour form, hours 1-12 match both halves of the day.
    Hour { hour: u32, is_12h: bool },
    /// ISO weekday, Monday = 1 through Sunday = 7.
    DayOfWeek(u32),
    /// Day of the month, 1-31. Months without that day are skipped.
    DayOfMonth(u32),
    /// Month of the year, 1-12.
    Month(u32),
    Year(i32),
}

/// How a periodic field lays out its occurrences.
struct Layout {
    slot: Grain,
    offset: (Grain, i64),
    step: (Grain, i64),
    grain: Grain,
}

impl Field {
    pub fn is_valid(&self) -> bool {
        match *self {
            Field::Second(s) => s < 60,
            Field::Minute(m) => m < 60,
            Field::Hour { hour, .. } => hour < 24,
            Field::DayOfWeek(d) => (1..=7).contains(&d),
            Field::DayOfMonth(d) => (1..=31).contains(&d),
            Field::Month(m) => (1..=12).contains(&m),
            Field::Year(y) => NaiveDate::from_ymd_opt(y, 1, 1).is_some(),
        }
    }

    pub fn grain(&self) -> Grain {
        match self {
            Field::Second(_) => Grain::Second,
            Field::Minute(_) => Grain::Minute,
            Field::Hour { .. } => Grain::Hour,
            Field::DayOfWeek(_) | Field::DayOfMonth(_) => Grain::Day,
            Field::Month(_) => Grain::Month,
            Field::Year(_) => Grain::Year,
        }
    }

    fn layout(&self) -> Option<Layout> {
        let grain = self.grain();
        let (slot, offset, step) = match *self {
            Field::Second(s) => (Grain::Minute, (Grain::Second, s as i64), (Grain::Minute, 1)),
            Field::Minute(m) => (Grain::Hour, (Grain::Minute, m as i64), (Grain::Hour, 1)),
            Field::Hour { hour, is_12h } if is_12h && hour <= 12 => {
                (Grain::Day, (Grain::Hour, (hour % 12) as i64), (Grain::Hour, 12))
            }
            Field::Hour { hour, .. } => (Grain::Day, (Grain::Hour, hour as i64), (Grain::Day, 1)),
            Field::DayOfWeek(d) => (Grain::Week, (Grain::Day, d as i64 - 1), (Grain::Week, 1)),
            Field::Month(m) => (Grain::Year, (Grain::Month, m as i64 - 1), (Grain::Year, 1)),
            Field::DayOfMonth(_) | Field::Year(_) => return None,
        };
        Some(Layout {
            slot,
            offset,
            step,
            grain,
        })
    }
}

impl Predicate for Field {
    fn evaluate(&self, anchor: &TimeObject, ctx: &TimeContext) -> Series {
        if !self.is_valid() {
            return Series::empty();
        }
        match *self {
            Field::Year(year) => year_series(year, anchor, ctx),
            Field::DayOfMonth(day) => day_of_month_series(day, anchor, ctx),
            _ => match self.layout() {
                Some(layout) => periodic_series(&layout, anchor, ctx),
                None => Series::empty(),
            },
        }
    }
}

fn periodic_series(layout: &Layout, anchor: &TimeObject, ctx: &TimeContext) -> Series {
    // Weekday slots are fixed ISO weeks whatever the context's week start.
    let slot = calendar::round(anchor.start, layout.slot, WeekStartDay::Monday);
    let Some(first) = calendar::add(slot, layout.offset.0, layout.offset.1) else {
        return Series::empty();
    };
    let (step_grain, step) = layout.step;
    let (past, future) = calendar::sequence(step_grain, step, TimeObject::new(first, layout.grain));
    let bound = *ctx;
    let grain = layout.grain;
    // `sequence` narrows the grain to the step grain; restore the field grain.
    rebucket(
        anchor,
        ctx,
        past.take_while(move |t| bound.recalls(t))
            .map(move |t| TimeObject::new(t.start, grain)),
        future
            .take_while(move |t| bound.reaches(t))
            .map(move |t| TimeObject::new(t.start, grain)),
    )
}

fn day_of_month_series(day: u32, anchor: &TimeObject, ctx: &TimeContext) -> Series {
    let month = TimeObject::new(
        calendar::round(anchor.start, Grain::Month, ctx.week_start),
        Grain::Month,
    );
    let (past, future) = calendar::sequence(Grain::Month, 1, month);
    let bound = *ctx;
    let in_month = move |m: TimeObject| {
        let date = m.start.date().with_day(day)?;
        Some(TimeObject::new(date.and_time(NaiveTime::MIN), Grain::Day))
    };
    rebucket(
        anchor,
        ctx,
        past.take_while(move |m| bound.recalls(m)).filter_map(in_month),
        future.take_while(move |m| bound.reaches(m)).filter_map(in_month),
    )
}

fn year_series(year: i32, anchor: &TimeObject, ctx: &TimeContext) -> Series {
    let occurrence = NaiveDate::from_ymd_opt(year, 1, 1)
        .map(|date| TimeObject::new(date.and_time(NaiveTime::MIN), Grain::Year));
    match occurrence {
        Some(t) if ctx.reaches(&t) && ctx.recalls(&t) => Series::single(anchor, t),
        _ => Series::empty(),
    }
}
