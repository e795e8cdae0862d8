//! The atomic periodic predicate.

use std::sync::Arc;

use crate::calendar::{self, TimeObject};
use crate::context::TimeContext;
use crate::grain::Grain;
use crate::predicate::{Pred, Predicate, Series};

/// Every `grain` unit, stepping one grain at a time in both directions.
///
/// An aligned cycle starts from the anchor rounded down to a grain boundary
/// ("every month" = calendar months). A sliding cycle starts exactly at the
/// anchor ("every 7 days from the 1st").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cycle {
    pub grain: Grain,
    pub aligned: bool,
}

impl Cycle {
    pub fn new(grain: Grain) -> Self {
        Cycle {
            grain,
            aligned: true,
        }
    }

    pub fn sliding(grain: Grain) -> Self {
        Cycle {
            grain,
            aligned: false,
        }
    }
}

impl Predicate for Cycle {
    fn evaluate(&self, anchor: &TimeObject, ctx: &TimeContext) -> Series {
        let start = if self.aligned {
            anchor.round(self.grain, ctx.week_start)
        } else {
            TimeObject::new(anchor.start, self.grain)
        };
        let (past, future) = calendar::sequence(self.grain, 1, start);
        let ctx = *ctx;
        Series::new(
            past.take_while(move |t| ctx.recalls(t)),
            future.take_while(move |t| ctx.reaches(t)),
        )
    }
}

/// Calendar-aligned cycle of `grain`.
pub fn cycle(grain: Grain) -> Pred {
    Arc::new(Cycle::new(grain))
}
