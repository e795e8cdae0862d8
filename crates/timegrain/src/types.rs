//! The value model carried through composition.

use std::ops::Neg;

use serde::Serialize;

use crate::context::TimeContext;
use crate::grain::Grain;
use crate::predicate::{Pred, Series};

/// Descriptive shape of a time value, used by rules for classification.
///
/// Never consulted when a predicate is grounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Form {
    DayOfWeek,
    Month { month: u32 },
    TimeOfDay { hour: Option<u32>, is_12h: bool },
    PartOfDay,
}

/// Which side of an open interval is anchored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Everything up to the value ("before 3pm").
    Before,
    /// Everything from the value on ("after 3pm").
    After,
}

/// A signed amount of a single grain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DurationData {
    pub value: i64,
    pub grain: Grain,
}

impl DurationData {
    pub fn new(value: i64, grain: Grain) -> Self {
        DurationData { value, grain }
    }
}

impl Neg for DurationData {
    type Output = DurationData;

    fn neg(self) -> DurationData {
        DurationData {
            value: self.value.saturating_neg(),
            grain: self.grain,
        }
    }
}

/// An ungrounded temporal concept: a predicate plus the metadata rules
/// inspect while composing.
#[derive(Debug, Clone)]
pub struct TimeData {
    pub predicate: Pred,
    pub grain: Grain,
    /// Ambiguous on its own ("3" could be a day, an hour, a month).
    pub latent: bool,
    pub form: Option<Form>,
    pub direction: Option<Direction>,
    /// The nearest occurrence must not overlap the reference time.
    pub not_immediate: bool,
}

impl TimeData {
    pub fn new(predicate: Pred, grain: Grain) -> Self {
        TimeData {
            predicate,
            grain,
            latent: false,
            form: None,
            direction: None,
            not_immediate: false,
        }
    }

    /// Ground this value at the context's reference time.
    pub fn ground(&self, ctx: &TimeContext) -> Series {
        self.predicate.evaluate(&ctx.reference, ctx)
    }
}

/// A semantic token handed over by the rule engine.
#[derive(Debug, Clone)]
pub enum Token {
    Numeral(f64),
    Ordinal(i64),
    Time(TimeData),
    TimeGrain(Grain),
    Duration(DurationData),
}

/// The integer carried by a numeral or ordinal token.
///
/// Numerals with a fractional part, or outside the `i64` range, carry none.
pub fn extract_int(token: &Token) -> Option<i64> {
    match token {
        Token::Numeral(value) => {
            let in_range = value.is_finite()
                && value.fract() == 0.0
                && *value >= i64::MIN as f64
                && *value < i64::MAX as f64;
            in_range.then_some(*value as i64)
        }
        Token::Ordinal(value) => Some(*value),
        Token::Time(_) | Token::TimeGrain(_) | Token::Duration(_) => None,
    }
}
