//! The predicate abstraction and its lazy occurrence streams.
//!
//! A [`Predicate`] grounded at an anchor yields a [`Series`]: `past` walks
//! backwards from the anchor (nearest first), `future` walks forwards
//! (nearest first). Streams are lazy iterators and always finite, because
//! every generator stops at the context horizon.

use std::fmt;
use std::sync::Arc;

use crate::calendar::TimeObject;
use crate::context::TimeContext;

/// A lazy, horizon-bounded stream of occurrences.
pub type TimeSeq = Box<dyn Iterator<Item = TimeObject> + Send>;

/// Shared handle to a predicate tree node.
pub type Pred = Arc<dyn Predicate>;

/// Occurrences of a predicate on both sides of an anchor.
pub struct Series {
    /// Occurrences ending at or before the anchor start, nearest first.
    pub past: TimeSeq,
    /// Occurrences ending after the anchor start, nearest first.
    pub future: TimeSeq,
}

impl Series {
    pub fn new<P, F>(past: P, future: F) -> Self
    where
        P: Iterator<Item = TimeObject> + Send + 'static,
        F: Iterator<Item = TimeObject> + Send + 'static,
    {
        Series {
            past: Box::new(past),
            future: Box::new(future),
        }
    }

    pub fn empty() -> Self {
        Series::new(std::iter::empty(), std::iter::empty())
    }

    /// A single occurrence, placed on the side of `anchor` it belongs to.
    pub fn single(anchor: &TimeObject, t: TimeObject) -> Self {
        if anchor.starts_before_end_of(&t) {
            Series::new(std::iter::empty(), std::iter::once(t))
        } else {
            Series::new(std::iter::once(t), std::iter::empty())
        }
    }

    pub fn into_parts(self) -> (TimeSeq, TimeSeq) {
        (self.past, self.future)
    }
}

impl fmt::Debug for Series {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Series").finish_non_exhaustive()
    }
}

/// A temporal concept that can be grounded against an anchor.
///
/// Implementations are immutable values; grounding the same predicate at
/// the same anchor and context always yields the same streams.
pub trait Predicate: fmt::Debug + Send + Sync {
    fn evaluate(&self, anchor: &TimeObject, ctx: &TimeContext) -> Series;
}

/// Ground `pred` at `anchor`, returning `(past, future)`.
pub fn evaluate(pred: &dyn Predicate, anchor: &TimeObject, ctx: &TimeContext) -> (TimeSeq, TimeSeq) {
    pred.evaluate(anchor, ctx).into_parts()
}

/// The predicate with no occurrences.
#[derive(Debug, Clone, Copy, Default)]
pub struct Empty;

impl Predicate for Empty {
    fn evaluate(&self, _anchor: &TimeObject, _ctx: &TimeContext) -> Series {
        Series::empty()
    }
}

pub fn empty() -> Pred {
    Arc::new(Empty)
}

/// Re-sort two candidate streams around `anchor` and bound them by the horizon.
///
/// `past` is expected nearest-first going backwards and `future`
/// nearest-first going forwards, but either may open with values that
/// belong on the other side. Those leading values are moved across and
/// reversed into order. Only leading runs are inspected, so the streams
/// stay lazy past the first correctly-placed value.
pub(crate) fn rebucket<P, F>(anchor: &TimeObject, ctx: &TimeContext, past: P, future: F) -> Series
where
    P: Iterator<Item = TimeObject> + Send + 'static,
    F: Iterator<Item = TimeObject> + Send + 'static,
{
    let anchor = *anchor;
    let ctx = *ctx;
    let mut past = past.peekable();
    let mut future = future.peekable();

    let mut crossed_forward = Vec::new();
    while let Some(t) = past.next_if(|t| anchor.starts_before_end_of(t)) {
        crossed_forward.push(t);
    }
    let mut crossed_back = Vec::new();
    while let Some(t) = future.next_if(|t| !anchor.starts_before_end_of(t)) {
        crossed_back.push(t);
    }
    crossed_forward.reverse();
    crossed_back.reverse();

    Series::new(
        crossed_back
            .into_iter()
            .chain(past)
            .take_while(move |t| ctx.recalls(t)),
        crossed_forward
            .into_iter()
            .chain(future)
            .take_while(move |t| ctx.reaches(t)),
    )
}

/// Map every occurrence of `base` through `f`, dropping `None`s, and
/// re-sort the results around `anchor`.
///
/// The base and `f` see the full horizon, since a base occurrence outside
/// the current window may map into it. Only the mapped results are held to
/// the window.
pub(crate) fn seq_map<F>(base: &dyn Predicate, anchor: &TimeObject, ctx: &TimeContext, f: F) -> Series
where
    F: Fn(&TimeObject, &TimeContext) -> Option<TimeObject> + Clone + Send + 'static,
{
    let wide = ctx.widened();
    let Series { past, future } = base.evaluate(anchor, &wide);
    let f_past = f.clone();
    rebucket(
        anchor,
        ctx,
        past.filter_map(move |t| f_past(&t, &wide)),
        future.filter_map(move |t| f(&t, &wide)),
    )
}
