//! Builders the rule engine calls to assemble `TimeData` values.
//!
//! Every builder is a thin composition of the combinators in
//! [`select`](crate::select), [`compose`](crate::compose) and
//! [`shift`](crate::shift). None of them grounds anything: the result is a
//! predicate tree plus metadata, resolved later against a context.

use std::sync::Arc;

use tracing::debug;

use crate::calendar::{resolve_timezone_name, IntervalType};
use crate::compose::{intersect, interval};
use crate::cycle::{cycle, Cycle};
use crate::field::Field;
use crate::grain::Grain;
use crate::select::{take_last_of, take_n, take_nth, take_nth_after};
use crate::shift::{shift_duration, shift_timezone};
use crate::types::{extract_int, Direction, DurationData, Form, TimeData, Token};

fn field(f: Field) -> TimeData {
    TimeData::new(Arc::new(f), f.grain())
}

// ── Point builders ──────────────────────────────────────────────────────────

/// An hour of the day. In 12-hour form, hours up to 12 match twice a day.
pub fn hour(is_12h: bool, h: u32) -> TimeData {
    time_of_day(Some(h), is_12h, field(Field::Hour { hour: h, is_12h }))
}

pub fn minute(m: u32) -> TimeData {
    field(Field::Minute(m))
}

pub fn second(s: u32) -> TimeData {
    field(Field::Second(s))
}

/// A weekday, Monday = 1. Said on that weekday it means the next one.
pub fn day_of_week(d: u32) -> TimeData {
    TimeData {
        not_immediate: true,
        ..form(Form::DayOfWeek, field(Field::DayOfWeek(d)))
    }
}

pub fn day_of_month(d: u32) -> TimeData {
    field(Field::DayOfMonth(d))
}

pub fn month(m: u32) -> TimeData {
    form(Form::Month { month: m }, field(Field::Month(m)))
}

pub fn year(y: i32) -> TimeData {
    field(Field::Year(y))
}

pub fn year_month_day(y: i32, m: u32, d: u32) -> TimeData {
    intersect(&year(y), &month_day(m, d))
}

pub fn month_day(m: u32, d: u32) -> TimeData {
    intersect(&month(m), &day_of_month(d))
}

pub fn hour_minute(is_12h: bool, h: u32, m: u32) -> TimeData {
    time_of_day(Some(h), is_12h, intersect(&hour(is_12h, h), &minute(m)))
}

pub fn hour_minute_second(is_12h: bool, h: u32, m: u32, s: u32) -> TimeData {
    time_of_day(
        Some(h),
        is_12h,
        intersect(&intersect(&hour(is_12h, h), &minute(m)), &second(s)),
    )
}

// ── Cyclic builders ─────────────────────────────────────────────────────────

/// The span of `n` whole grains from the current one ("the next 3 days").
pub fn cycle_n(not_immediate: bool, grain: Grain, n: i64) -> TimeData {
    TimeData::new(take_n(n, not_immediate, cycle(grain)), grain)
}

/// The `n`-th grain from the current one ("next week" = 1, "last year" = -1).
pub fn cycle_nth(grain: Grain, n: i64) -> TimeData {
    TimeData::new(take_nth(n, false, cycle(grain)), grain)
}

/// The `n`-th grain counted from each occurrence of `base`.
pub fn cycle_nth_after(not_immediate: bool, grain: Grain, n: i64, base: &TimeData) -> TimeData {
    TimeData::new(
        take_nth_after(n, not_immediate, cycle(grain), base.predicate.clone()),
        grain,
    )
}

/// The last grain inside each occurrence of `base` ("last day of March").
pub fn cycle_last_of(grain: Grain, base: &TimeData) -> TimeData {
    TimeData::new(take_last_of(cycle(grain), base.predicate.clone()), grain)
}

/// The `n`-th occurrence of `td` ("next Monday", "last March").
pub fn pred_nth(n: i64, not_immediate: bool, td: &TimeData) -> TimeData {
    TimeData {
        predicate: take_nth(n, not_immediate, td.predicate.clone()),
        not_immediate: false,
        latent: false,
        ..td.clone()
    }
}

/// The `n`-th occurrence of `cyclic` after each occurrence of `base`
/// ("the second Tuesday after Easter").
pub fn pred_nth_after(n: i64, cyclic: &TimeData, base: &TimeData) -> TimeData {
    TimeData {
        predicate: take_nth_after(n, true, cyclic.predicate.clone(), base.predicate.clone()),
        not_immediate: false,
        latent: false,
        ..cyclic.clone()
    }
}

/// The last occurrence of `cyclic` inside each occurrence of `base`
/// ("last Sunday of October").
pub fn pred_last_of(cyclic: &TimeData, base: &TimeData) -> TimeData {
    TimeData {
        predicate: take_last_of(cyclic.predicate.clone(), base.predicate.clone()),
        not_immediate: false,
        latent: false,
        ..cyclic.clone()
    }
}

// ── Duration builders ───────────────────────────────────────────────────────

/// The reference time moved forward by `duration` ("in 3 days").
pub fn in_duration(duration: DurationData) -> TimeData {
    let now = take_nth(0, false, cycle(Grain::Second));
    TimeData::new(shift_duration(now, duration), duration.grain)
}

/// The reference time moved back by `duration` ("3 days ago").
pub fn duration_ago(duration: DurationData) -> TimeData {
    in_duration(-duration)
}

/// Each occurrence of `td` moved forward by `duration` ("2 days after Monday").
pub fn duration_after(duration: DurationData, td: &TimeData) -> TimeData {
    TimeData::new(shift_duration(td.predicate.clone(), duration), duration.grain)
}

pub fn duration_before(duration: DurationData, td: &TimeData) -> TimeData {
    duration_after(-duration, td)
}

// ── Metadata setters ────────────────────────────────────────────────────────

pub fn mk_latent(td: TimeData) -> TimeData {
    TimeData { latent: true, ..td }
}

pub fn not_latent(td: TimeData) -> TimeData {
    TimeData { latent: false, ..td }
}

pub fn form(form: Form, td: TimeData) -> TimeData {
    TimeData {
        form: Some(form),
        ..td
    }
}

pub fn part_of_day(td: TimeData) -> TimeData {
    form(Form::PartOfDay, td)
}

pub fn time_of_day(hour: Option<u32>, is_12h: bool, td: TimeData) -> TimeData {
    form(Form::TimeOfDay { hour, is_12h }, td)
}

/// Pin a time of day to the morning or afternoon half ("3pm", "7 am").
pub fn time_of_day_ampm(is_am: bool, td: &TimeData) -> TimeData {
    let (from, to) = if is_am {
        (hour(false, 0), hour(false, 12))
    } else {
        (hour(false, 12), hour(false, 0))
    };
    let half = interval(IntervalType::Open, &from, &to);
    time_of_day(None, false, intersect(td, &half))
}

pub fn with_direction(direction: Direction, td: TimeData) -> TimeData {
    TimeData {
        direction: Some(direction),
        ..td
    }
}

// ── Composite idioms ────────────────────────────────────────────────────────

/// Friday 18:00 up to Tuesday 00:00 around each occurrence of `monday`.
pub fn long_weekend_before(monday: &TimeData) -> TimeData {
    let friday = cycle_nth_after(false, Grain::Day, -3, monday);
    let tuesday = cycle_nth_after(false, Grain::Day, 1, monday);
    let start = intersect(&friday, &hour(false, 18));
    let end = intersect(&tuesday, &hour(false, 0));
    interval(IntervalType::Open, &start, &end)
}

/// Every `dow` (Monday = 1) inside month `m`.
pub fn days_of_week_of_month(dow: u32, m: u32) -> TimeData {
    intersect(&day_of_week(dow), &month(m))
}

/// The `n`-th `dow` of month `m`, zero-indexed ("first Monday of March" is
/// `nth_dow_of_month(0, 1, 3)`).
///
/// The n-th seven-day window counted from the 1st of the month holds
/// exactly one of each weekday.
pub fn nth_dow_of_month(n: i64, dow: u32, m: u32) -> TimeData {
    let window = TimeData::new(
        take_nth_after(
            n,
            false,
            Arc::new(Cycle::sliding(Grain::Week)),
            month_day(m, 1).predicate,
        ),
        Grain::Week,
    );
    intersect(&days_of_week_of_month(dow, m), &window)
}

/// Restrict `td` to the day of the month carried by `token` ("March 3").
pub fn intersect_dom(td: &TimeData, token: &Token) -> Option<TimeData> {
    let day = extract_int(token).filter(|d| (1..=31).contains(d))?;
    let day = u32::try_from(day).ok()?;
    Some(intersect(&day_of_month(day), td))
}

/// `n` minutes before a whole-hour time of day ("ten to five").
pub fn minutes_before(n: i64, td: &TimeData) -> Option<TimeData> {
    minutes_offset(n.checked_neg()?, td)
}

/// `n` minutes after a whole-hour time of day ("quarter past three").
pub fn minutes_after(n: i64, td: &TimeData) -> Option<TimeData> {
    minutes_offset(n, td)
}

fn minutes_offset(delta: i64, td: &TimeData) -> Option<TimeData> {
    let Some(Form::TimeOfDay {
        hour: Some(h),
        is_12h,
    }) = td.form
    else {
        return None;
    };
    let period = if is_12h { 12 * 60 } else { 24 * 60 };
    let total = (i64::from(h) * 60).checked_add(delta)?.rem_euclid(period);
    let (h, m) = (total / 60, total % 60);
    // 12-hour clocks have no hour 0.
    let h = if is_12h && h == 0 { 12 } else { h };
    Some(hour_minute(is_12h, u32::try_from(h).ok()?, u32::try_from(m).ok()?))
}

// ── Supplementary ───────────────────────────────────────────────────────────

pub fn now() -> TimeData {
    TimeData::new(take_nth(0, false, cycle(Grain::Second)), Grain::Second)
}

pub fn today() -> TimeData {
    cycle_nth(Grain::Day, 0)
}

/// Friday 18:00 up to Monday 00:00.
pub fn weekend() -> TimeData {
    let start = intersect(&day_of_week(5), &hour(false, 18));
    let end = intersect(&day_of_week(1), &hour(false, 0));
    interval(IntervalType::Open, &start, &end)
}

/// `td` read in the named timezone ("3pm CET"). `None` for unknown names.
pub fn in_timezone(name: &str, td: &TimeData) -> Option<TimeData> {
    let Some(tz) = resolve_timezone_name(name) else {
        debug!(name, "in_timezone: unknown timezone");
        return None;
    };
    Some(TimeData {
        predicate: shift_timezone(tz, td.predicate.clone()),
        ..td.clone()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{Instant, TimeObject};
    use crate::context::{ResolveOptions, TimeContext};
    use chrono::NaiveDate;
    use chrono_tz::Tz;

    fn at(y: i32, m: u32, d: u32, h: u32, mi: u32) -> Instant {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, mi, 0)
            .unwrap()
    }

    /// Wednesday 2026-02-18 14:30 in UTC.
    fn ctx() -> TimeContext {
        ctx_at(at(2026, 2, 18, 14, 30))
    }

    fn ctx_at(t: Instant) -> TimeContext {
        TimeContext::from_local(t, Tz::UTC, &ResolveOptions::default())
    }

    fn next(td: &TimeData, ctx: &TimeContext) -> TimeObject {
        td.ground(ctx).future.next().unwrap()
    }

    fn upcoming(td: &TimeData, ctx: &TimeContext, k: usize) -> Vec<TimeObject> {
        td.ground(ctx).future.take(k).collect()
    }

    // ── Points ──────────────────────────────────────────────────────────

    #[test]
    fn test_hour_twelve_hour_form_matches_both_halves() {
        let starts: Vec<_> = upcoming(&hour(true, 3), &ctx(), 2)
            .iter()
            .map(|t| t.start)
            .collect();
        assert_eq!(starts, vec![at(2026, 2, 18, 15, 0), at(2026, 2, 19, 3, 0)]);
        assert_eq!(
            hour(true, 3).form,
            Some(Form::TimeOfDay {
                hour: Some(3),
                is_12h: true
            })
        );
    }

    #[test]
    fn test_day_of_week_is_not_immediate() {
        let td = day_of_week(3);
        assert!(td.not_immediate);
        assert_eq!(td.form, Some(Form::DayOfWeek));
        // Grounded on a Wednesday, today's occurrence is still the first future one.
        assert_eq!(next(&td, &ctx()).start, at(2026, 2, 18, 0, 0));
    }

    #[test]
    fn test_year_month_day() {
        let t = next(&year_month_day(2027, 7, 4), &ctx());
        assert_eq!(t, TimeObject::new(at(2027, 7, 4, 0, 0), Grain::Day));
        assert!(year_month_day(2025, 7, 4).ground(&ctx()).future.next().is_none());
    }

    #[test]
    fn test_month_day_skips_past_occurrence() {
        let t = next(&month_day(2, 3), &ctx());
        assert_eq!(t.start, at(2027, 2, 3, 0, 0));
        assert_eq!(month_day(2, 3).grain, Grain::Day);
    }

    #[test]
    fn test_hour_minute_second() {
        let td = hour_minute_second(false, 9, 15, 30);
        let t = next(&td, &ctx());
        assert_eq!(t.start, at(2026, 2, 19, 9, 15) + chrono::Duration::seconds(30));
        assert_eq!(t.grain, Grain::Second);
        assert!(matches!(td.form, Some(Form::TimeOfDay { hour: Some(9), .. })));
    }

    // ── Cycles ──────────────────────────────────────────────────────────

    #[test]
    fn test_cycle_nth_next_week() {
        let t = next(&cycle_nth(Grain::Week, 1), &ctx());
        assert_eq!(t, TimeObject::new(at(2026, 2, 23, 0, 0), Grain::Week));
    }

    #[test]
    fn test_cycle_n_next_three_days() {
        let t = next(&cycle_n(false, Grain::Day, 3), &ctx());
        assert_eq!(t.start, at(2026, 2, 18, 0, 0));
        assert_eq!(t.end, Some(at(2026, 2, 21, 0, 0)));
    }

    #[test]
    fn test_cycle_last_of_month() {
        let t = next(&cycle_last_of(Grain::Day, &month(2)), &ctx());
        assert_eq!(t.start, at(2026, 2, 28, 0, 0));
    }

    #[test]
    fn test_pred_last_of_sunday_of_october() {
        let t = next(&pred_last_of(&day_of_week(7), &month(10)), &ctx());
        assert_eq!(t.start, at(2026, 10, 25, 0, 0));
    }

    #[test]
    fn test_pred_nth_next_monday() {
        let td = pred_nth(1, false, &day_of_week(1));
        assert_eq!(next(&td, &ctx()).start, at(2026, 3, 2, 0, 0));
        assert!(!td.not_immediate);
        assert_eq!(td.form, Some(Form::DayOfWeek));
    }

    #[test]
    fn test_selection_of_latent_value_is_not_latent() {
        let three = mk_latent(hour(false, 3));
        assert!(!pred_nth(0, false, &three).latent);
        assert!(!pred_nth_after(0, &three, &day_of_week(1)).latent);
        assert!(!pred_last_of(&three, &day_of_week(1)).latent);

        let next_three = pred_nth(0, false, &three);
        assert_eq!(next(&next_three, &ctx()).start, at(2026, 2, 19, 3, 0));
        assert_eq!(next_three.form, three.form);
        let resolved = next_three.resolve(&ctx(), &ResolveOptions::default());
        assert!(resolved.is_some_and(|r| !r.latent));
    }

    #[test]
    fn test_pred_nth_after_tuesday_after_march_first() {
        // March 1st 2026 is a Sunday.
        let td = pred_nth_after(1, &day_of_week(2), &month_day(3, 1));
        assert_eq!(next(&td, &ctx()).start, at(2026, 3, 10, 0, 0));
    }

    // ── Durations ───────────────────────────────────────────────────────

    #[test]
    fn test_in_duration_three_days() {
        let t = next(&in_duration(DurationData::new(3, Grain::Day)), &ctx());
        assert_eq!(t, TimeObject::new(at(2026, 2, 21, 14, 0), Grain::Hour));
    }

    #[test]
    fn test_duration_ago_lands_in_past() {
        let td = duration_ago(DurationData::new(2, Grain::Hour));
        let series = td.ground(&ctx());
        let (mut past, mut future) = (series.past, series.future);
        assert!(future.next().is_none());
        assert_eq!(past.next().unwrap().start, at(2026, 2, 18, 12, 30));
    }

    #[test]
    fn test_duration_after_and_before_monday() {
        let monday = day_of_week(1);
        // Two days after this week's Monday is today.
        let after = next(&duration_after(DurationData::new(2, Grain::Day), &monday), &ctx());
        assert_eq!(after, TimeObject::new(at(2026, 2, 18, 0, 0), Grain::Day));
        let before = next(&duration_before(DurationData::new(1, Grain::Day), &monday), &ctx());
        assert_eq!(before.start, at(2026, 2, 22, 0, 0));
    }

    // ── Metadata ────────────────────────────────────────────────────────

    #[test]
    fn test_latency_setters() {
        assert!(mk_latent(hour(false, 3)).latent);
        assert!(!not_latent(mk_latent(hour(false, 3))).latent);
    }

    #[test]
    fn test_with_direction() {
        let td = with_direction(Direction::After, hour(false, 15));
        assert_eq!(td.direction, Some(Direction::After));
    }

    #[test]
    fn test_time_of_day_ampm() {
        let pm = time_of_day_ampm(false, &hour(true, 3));
        assert_eq!(
            pm.form,
            Some(Form::TimeOfDay {
                hour: None,
                is_12h: false
            })
        );
        let starts: Vec<_> = upcoming(&pm, &ctx(), 2).iter().map(|t| t.start).collect();
        assert_eq!(starts, vec![at(2026, 2, 18, 15, 0), at(2026, 2, 19, 15, 0)]);

        let am = time_of_day_ampm(true, &hour(true, 3));
        assert_eq!(next(&am, &ctx()).start, at(2026, 2, 19, 3, 0));
    }

    // ── Idioms ──────────────────────────────────────────────────────────

    #[test]
    fn test_long_weekend_before_monday() {
        // Memorial Day 2026: the last Monday of May.
        let memorial = pred_last_of(&day_of_week(1), &month(5));
        let t = next(&long_weekend_before(&memorial), &ctx());
        assert_eq!(t.start, at(2026, 5, 22, 18, 0));
        assert_eq!(t.end, Some(at(2026, 5, 26, 0, 0)));
    }

    #[test]
    fn test_weekend() {
        let t = next(&weekend(), &ctx());
        assert_eq!(t.start, at(2026, 2, 20, 18, 0));
        assert_eq!(t.end, Some(at(2026, 2, 23, 0, 0)));
    }

    #[test]
    fn test_days_of_week_of_month() {
        let starts: Vec<_> = upcoming(&days_of_week_of_month(1, 3), &ctx(), 3)
            .iter()
            .map(|t| t.start)
            .collect();
        assert_eq!(
            starts,
            vec![at(2026, 3, 2, 0, 0), at(2026, 3, 9, 0, 0), at(2026, 3, 16, 0, 0)]
        );
    }

    #[test]
    fn test_nth_dow_of_month() {
        // March 1st 2026 is a Sunday, so the first Monday is the 2nd.
        assert_eq!(next(&nth_dow_of_month(0, 1, 3), &ctx()).start, at(2026, 3, 2, 0, 0));
        assert_eq!(next(&nth_dow_of_month(2, 1, 3), &ctx()).start, at(2026, 3, 16, 0, 0));
        // The first Sunday is the 1st itself.
        assert_eq!(next(&nth_dow_of_month(0, 7, 3), &ctx()).start, at(2026, 3, 1, 0, 0));
    }

    #[test]
    fn test_intersect_dom() {
        let td = intersect_dom(&month(3), &Token::Numeral(3.0)).unwrap();
        assert_eq!(next(&td, &ctx()).start, at(2026, 3, 3, 0, 0));
        assert!(intersect_dom(&month(3), &Token::Ordinal(32)).is_none());
        assert!(intersect_dom(&month(3), &Token::Numeral(2.5)).is_none());
        assert!(intersect_dom(&month(3), &Token::TimeGrain(Grain::Day)).is_none());
    }

    fn same_time(a: &TimeData, b: &TimeData) {
        assert_eq!(a.form, b.form);
        assert_eq!(upcoming(a, &ctx(), 3), upcoming(b, &ctx(), 3));
    }

    #[test]
    fn test_minutes_before_rollover() {
        same_time(
            &minutes_before(10, &hour_minute(false, 5, 0)).unwrap(),
            &hour_minute(false, 4, 50),
        );
        same_time(
            &minutes_before(10, &hour_minute(false, 0, 0)).unwrap(),
            &hour_minute(false, 23, 50),
        );
        same_time(
            &minutes_before(10, &hour_minute(true, 1, 0)).unwrap(),
            &hour_minute(true, 12, 50),
        );
    }

    #[test]
    fn test_minutes_after() {
        same_time(
            &minutes_after(15, &hour(true, 3)).unwrap(),
            &hour_minute(true, 3, 15),
        );
        same_time(
            &minutes_after(20, &hour(false, 23)).unwrap(),
            &hour_minute(false, 23, 20),
        );
    }

    #[test]
    fn test_minutes_before_needs_hour_form() {
        assert!(minutes_before(10, &month(3)).is_none());
        assert!(minutes_before(10, &time_of_day_ampm(false, &hour(true, 3))).is_none());
    }

    #[test]
    fn test_now_and_today() {
        assert_eq!(next(&now(), &ctx()), TimeObject::new(at(2026, 2, 18, 14, 30), Grain::Second));
        assert_eq!(next(&today(), &ctx()), TimeObject::new(at(2026, 2, 18, 0, 0), Grain::Day));
    }

    #[test]
    fn test_in_timezone() {
        let td = in_timezone("cet", &hour(false, 15)).unwrap();
        // 15:00 in Paris is 14:00 UTC in February.
        assert_eq!(next(&td, &ctx_at(at(2026, 2, 18, 9, 0))).start, at(2026, 2, 18, 14, 0));
        assert!(in_timezone("Mars/Olympus", &hour(false, 15)).is_none());
    }
}
