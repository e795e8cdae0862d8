//! Shift combinators: move occurrences by a duration or between timezones.

use std::sync::Arc;

use chrono_tz::Tz;

use crate::calendar::{self, active_offset, TimeObject};
use crate::context::TimeContext;
use crate::grain::Grain;
use crate::predicate::{seq_map, Pred, Predicate, Series};
use crate::types::DurationData;

/// The grain an occurrence is floored to before a duration of `grain` is added.
///
/// Coarse durations drop finer noise: "in a year" lands on a month, "in a
/// month" on a day, "in 3 days" on an hour.
pub fn rounding_grain(grain: Grain) -> Grain {
    match grain {
        Grain::Second | Grain::Minute => Grain::Second,
        Grain::Hour => Grain::Minute,
        Grain::Day => Grain::Hour,
        Grain::Week | Grain::Month => Grain::Day,
        Grain::Quarter | Grain::Year => Grain::Month,
    }
}

// ── ShiftDuration ───────────────────────────────────────────────────────────

/// Every occurrence of `pred`, rounded and moved by `duration`.
#[derive(Debug, Clone)]
pub struct ShiftDuration {
    pub pred: Pred,
    pub duration: DurationData,
}

impl Predicate for ShiftDuration {
    fn evaluate(&self, anchor: &TimeObject, ctx: &TimeContext) -> Series {
        let DurationData { value, grain } = self.duration;
        let rounding = rounding_grain(grain);
        seq_map(self.pred.as_ref(), anchor, ctx, move |t, ctx| {
            // Rounding coarsens fine values but never refines coarse ones.
            let kept = t.grain.max(rounding).min(grain);
            let start = calendar::round(t.start, rounding, ctx.week_start);
            TimeObject::new(start, kept).plus(grain, value)
        })
    }
}

pub fn shift_duration(pred: Pred, duration: DurationData) -> Pred {
    Arc::new(ShiftDuration { pred, duration })
}

// ── ShiftTimezone ───────────────────────────────────────────────────────────

/// Every occurrence of `pred` read as wall-clock time in `target` and moved
/// into the context timezone ("3pm CET" seen from New York).
///
/// Only the start moves. Values with an explicit end keep it, so this is
/// meant for time-of-day values; a moved start that passes the end drops it.
#[derive(Debug, Clone)]
pub struct ShiftTimezone {
    pub target: Tz,
    pub pred: Pred,
}

impl Predicate for ShiftTimezone {
    fn evaluate(&self, anchor: &TimeObject, ctx: &TimeContext) -> Series {
        let target = self.target;
        seq_map(self.pred.as_ref(), anchor, ctx, move |t, ctx| {
            let delta = active_offset(&ctx.timezone, t.start) - active_offset(&target, t.start);
            let start = calendar::add(t.start, Grain::Minute, i64::from(delta))?;
            Some(TimeObject {
                start,
                end: t.end.filter(|end| *end > start),
                grain: t.grain,
            })
        })
    }
}

pub fn shift_timezone(target: Tz, pred: Pred) -> Pred {
    Arc::new(ShiftTimezone { target, pred })
}
