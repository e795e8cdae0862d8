//! Selector combinators: pick occurrences of a predicate by position.
//!
//! Indexing is shared by every selector: `n >= 0` counts into the future
//! (0 = nearest), `n < 0` counts into the past (-1 = nearest, "last X").

use std::sync::Arc;

use tracing::debug;

use crate::calendar::{build_interval, IntervalType, TimeObject};
use crate::context::TimeContext;
use crate::predicate::{seq_map, Pred, Predicate, Series};

/// Pick the `n`-th occurrence of `series`, optionally dropping a leading
/// future occurrence first.
fn pick(mut series: Series, n: i64, drop_first: impl FnOnce(&TimeObject) -> bool) -> Option<TimeObject> {
    if n >= 0 {
        let mut future = series.future.peekable();
        future.next_if(drop_first);
        future.nth(usize::try_from(n).ok()?)
    } else {
        series.past.nth(usize::try_from(-(n + 1)).ok()?)
    }
}

// ── takeNth ─────────────────────────────────────────────────────────────────

/// The single occurrence at index `n`.
///
/// With `not_immediate`, a nearest future occurrence that overlaps the
/// anchor is skipped: "next Monday" said on a Monday is a week away.
#[derive(Debug, Clone)]
pub struct TakeNth {
    pub n: i64,
    pub not_immediate: bool,
    pub pred: Pred,
}

impl Predicate for TakeNth {
    fn evaluate(&self, anchor: &TimeObject, ctx: &TimeContext) -> Series {
        let series = self.pred.evaluate(anchor, ctx);
        let not_immediate = self.not_immediate;
        let picked = pick(series, self.n, |ahead| {
            not_immediate && ahead.intersect(anchor).is_some()
        });
        match picked {
            Some(t) => Series::single(anchor, t),
            None => {
                debug!(n = self.n, "take_nth: sequence exhausted before index");
                Series::empty()
            }
        }
    }
}

pub fn take_nth(n: i64, not_immediate: bool, pred: Pred) -> Pred {
    Arc::new(TakeNth {
        n,
        not_immediate,
        pred,
    })
}

// ── takeN ───────────────────────────────────────────────────────────────────

/// An interval covering `|n|` consecutive occurrences ("the next three days").
///
/// Forward runs end where occurrence `n` starts; backward runs end where the
/// nearest past occurrence ends.
#[derive(Debug, Clone)]
pub struct TakeN {
    pub n: i64,
    pub not_immediate: bool,
    pub pred: Pred,
}

impl TakeN {
    fn span(&self, anchor: &TimeObject, ctx: &TimeContext) -> Option<TimeObject> {
        let Series { past, future } = self.pred.evaluate(anchor, ctx);
        if self.n >= 0 {
            let mut future = future.peekable();
            if self.not_immediate {
                future.next_if(|ahead| ahead.intersect(anchor).is_some());
            }
            let first = future.next()?;
            let last = match usize::try_from(self.n).ok()? {
                0 => first,
                n => future.nth(n - 1)?,
            };
            build_interval(IntervalType::Open, &first, &last)
        } else {
            let mut past = past;
            let nearest = past.next()?;
            let farthest = match usize::try_from(-(self.n + 1)).ok()? {
                0 => nearest,
                n => past.nth(n - 1)?,
            };
            build_interval(IntervalType::Closed, &farthest, &nearest)
        }
    }
}

impl Predicate for TakeN {
    fn evaluate(&self, anchor: &TimeObject, ctx: &TimeContext) -> Series {
        match self.span(anchor, ctx) {
            Some(t) => Series::single(anchor, t),
            None => {
                debug!(n = self.n, "take_n: no interval for requested run");
                Series::empty()
            }
        }
    }
}

pub fn take_n(n: i64, not_immediate: bool, pred: Pred) -> Pred {
    Arc::new(TakeN {
        n,
        not_immediate,
        pred,
    })
}

// ── takeNthAfter ────────────────────────────────────────────────────────────

/// For each `base` occurrence, the `n`-th `cyclic` occurrence anchored there
/// ("the second Tuesday after Easter").
///
/// With `not_immediate`, a cyclic occurrence starting at or before the base
/// occurrence is skipped.
#[derive(Debug, Clone)]
pub struct TakeNthAfter {
    pub n: i64,
    pub not_immediate: bool,
    pub cyclic: Pred,
    pub base: Pred,
}

impl Predicate for TakeNthAfter {
    fn evaluate(&self, anchor: &TimeObject, ctx: &TimeContext) -> Series {
        let (n, not_immediate, cyclic) = (self.n, self.not_immediate, self.cyclic.clone());
        seq_map(self.base.as_ref(), anchor, ctx, move |t, ctx| {
            let series = cyclic.evaluate(t, ctx);
            pick(series, n, |ahead| not_immediate && !t.before(ahead))
        })
    }
}

pub fn take_nth_after(n: i64, not_immediate: bool, cyclic: Pred, base: Pred) -> Pred {
    Arc::new(TakeNthAfter {
        n,
        not_immediate,
        cyclic,
        base,
    })
}

// ── takeLastOf ──────────────────────────────────────────────────────────────

/// For each `base` occurrence, the last `cyclic` occurrence inside it
/// ("the last Friday of the month").
#[derive(Debug, Clone)]
pub struct TakeLastOf {
    pub cyclic: Pred,
    pub base: Pred,
}

impl Predicate for TakeLastOf {
    fn evaluate(&self, anchor: &TimeObject, ctx: &TimeContext) -> Series {
        let cyclic = self.cyclic.clone();
        seq_map(self.base.as_ref(), anchor, ctx, move |t, ctx| {
            let mut past = cyclic.evaluate(&t.starting_at_end_of(), ctx).past;
            past.next().filter(|last| !last.before(t))
        })
    }
}

pub fn take_last_of(cyclic: Pred, base: Pred) -> Pred {
    Arc::new(TakeLastOf { cyclic, base })
}
