//! Composition combinators: conjunction and interval construction.

use std::sync::Arc;

use crate::calendar::{build_interval, IntervalType, TimeObject};
use crate::context::TimeContext;
use crate::grain::Grain;
use crate::predicate::{seq_map, Pred, Predicate, Series};
use crate::types::TimeData;

// ── Intersect ───────────────────────────────────────────────────────────────

/// Occurrences of `fine` that fall within occurrences of `coarse`, in the
/// order of the coarse stream ("March 3rd" = the 3rd within each March).
///
/// The fine predicate is grounded once per coarse occurrence with the
/// horizon narrowed to that occurrence, so a sparse fine predicate never
/// searches past it.
#[derive(Debug, Clone)]
pub struct Intersect {
    pub coarse: Pred,
    pub fine: Pred,
}

impl Predicate for Intersect {
    fn evaluate(&self, anchor: &TimeObject, ctx: &TimeContext) -> Series {
        let Series { past, future } = self.coarse.evaluate(anchor, ctx);
        let mut future = future.peekable();

        // Coarse occurrences overlapping the anchor contribute on both sides.
        let mut straddling = Vec::new();
        while let Some(c) = future.next_if(|c| c.start < anchor.start) {
            straddling.push(c);
        }

        let anchor = *anchor;
        let ctx = *ctx;
        let fine_split = self.fine.clone();
        let fine_back = self.fine.clone();
        let fine_ahead = self.fine.clone();

        let split_past = straddling.clone().into_iter().flat_map(move |c| {
            let inner = ctx.narrowed(c.start, c.end_instant());
            let items = fine_split.evaluate(&anchor, &inner).past;
            items.filter_map(move |f| c.intersect(&f))
        });
        let earlier = past.flat_map(move |c| {
            let inner = ctx.narrowed(c.start, c.end_instant());
            let Series { past, future } = fine_back.evaluate(&c.starting_at_end_of(), &inner);
            // Only the first future value can overlap the coarse end.
            future
                .take(1)
                .chain(past)
                .filter_map(move |f| c.intersect(&f))
        });
        let later = straddling.into_iter().chain(future).flat_map(move |c| {
            let inner = ctx.narrowed(c.start, c.end_instant());
            let from = if c.start < anchor.start { anchor } else { c };
            let items = fine_ahead.evaluate(&from, &inner).future;
            items.filter_map(move |f| c.intersect(&f))
        });

        Series::new(split_past.chain(earlier), later)
    }
}

/// Conjunction of two values. The coarser operand drives the order; the
/// result has the finer grain.
pub fn intersect(a: &TimeData, b: &TimeData) -> TimeData {
    let (coarse, fine) = if a.grain < b.grain { (b, a) } else { (a, b) };
    TimeData {
        predicate: Arc::new(Intersect {
            coarse: coarse.predicate.clone(),
            fine: fine.predicate.clone(),
        }),
        grain: a.grain.min(b.grain),
        latent: false,
        form: None,
        direction: a.direction.or(b.direction),
        not_immediate: false,
    }
}

// ── Intervals ───────────────────────────────────────────────────────────────

/// For each `from` occurrence, the interval up to the nearest following
/// `to` occurrence.
#[derive(Debug, Clone)]
pub struct Intervals {
    pub kind: IntervalType,
    pub from: Pred,
    pub to: Pred,
}

impl Predicate for Intervals {
    fn evaluate(&self, anchor: &TimeObject, ctx: &TimeContext) -> Series {
        let (kind, to) = (self.kind, self.to.clone());
        seq_map(self.from.as_ref(), anchor, ctx, move |start, ctx| {
            to.evaluate(start, ctx)
                .future
                .find_map(|end| build_interval(kind, start, &end))
        })
    }
}

/// Interval between two point values.
///
/// Day-to-day ranges are always closed ("Monday to Wednesday" includes
/// Wednesday); otherwise `kind` is used as given.
pub fn interval(kind: IntervalType, from: &TimeData, to: &TimeData) -> TimeData {
    let kind = if from.grain == Grain::Day && to.grain == Grain::Day {
        IntervalType::Closed
    } else {
        kind
    };
    TimeData::new(
        Arc::new(Intervals {
            kind,
            from: from.predicate.clone(),
            to: to.predicate.clone(),
        }),
        from.grain.min(to.grain),
    )
}
