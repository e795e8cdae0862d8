//! Boolean token tests used by rules as preconditions.

use crate::grain::Grain;
use crate::types::{extract_int, Form, TimeData, Token};

fn time_data(token: &Token) -> Option<&TimeData> {
    match token {
        Token::Time(td) => Some(td),
        _ => None,
    }
}

fn hour_of(token: &Token) -> Option<u32> {
    match time_data(token)?.form? {
        Form::TimeOfDay { hour, .. } => hour,
        _ => None,
    }
}

/// A grain token equal to `value`.
pub fn is_grain(value: Grain, token: &Token) -> bool {
    matches!(token, Token::TimeGrain(grain) if *grain == value)
}

/// A time token whose grain is `value`.
pub fn is_grain_of_time(value: Grain, token: &Token) -> bool {
    time_data(token).is_some_and(|td| td.grain == value)
}

/// A time token strictly finer than `value`.
pub fn is_grain_finer_than(value: Grain, token: &Token) -> bool {
    time_data(token).is_some_and(|td| td.grain < value)
}

pub fn is_a_day_of_week(token: &Token) -> bool {
    time_data(token).is_some_and(|td| matches!(td.form, Some(Form::DayOfWeek)))
}

pub fn is_a_month(token: &Token) -> bool {
    time_data(token).is_some_and(|td| matches!(td.form, Some(Form::Month { .. })))
}

pub fn is_a_time_of_day(token: &Token) -> bool {
    time_data(token).is_some_and(|td| matches!(td.form, Some(Form::TimeOfDay { .. })))
}

pub fn is_a_part_of_day(token: &Token) -> bool {
    time_data(token).is_some_and(|td| matches!(td.form, Some(Form::PartOfDay)))
}

/// A whole hour of the day ("3pm"), not a minute-precise time ("3:15pm").
pub fn is_an_hour_of_day(token: &Token) -> bool {
    hour_of(token).is_some() && time_data(token).is_some_and(|td| td.grain >= Grain::Hour)
}

pub fn is_midnight_or_noon(token: &Token) -> bool {
    matches!(hour_of(token), Some(0 | 12))
}

pub fn is_not_latent(token: &Token) -> bool {
    time_data(token).is_some_and(|td| !td.latent)
}

/// A whole numeral within `[low, high]`.
pub fn is_integer_between(low: i64, high: i64, token: &Token) -> bool {
    matches!(token, Token::Numeral(_))
        && extract_int(token).is_some_and(|n| (low..=high).contains(&n))
}

/// An ordinal within `[low, high]`.
pub fn is_ordinal_between(low: i64, high: i64, token: &Token) -> bool {
    matches!(token, Token::Ordinal(n) if (low..=high).contains(n))
}

/// A numeral that can be a day of the month.
pub fn is_dom_integer(token: &Token) -> bool {
    is_integer_between(1, 31, token)
}

/// An ordinal that can be a day of the month.
pub fn is_dom_ordinal(token: &Token) -> bool {
    is_ordinal_between(1, 31, token)
}

pub fn is_dom_value(token: &Token) -> bool {
    is_dom_integer(token) || is_dom_ordinal(token)
}
