//! Picking the answer a value denotes and rendering it for callers.
//!
//! Grounding yields streams; resolution chooses one occurrence (plus a few
//! alternatives), attaches the context timezone's UTC offset and produces
//! serializable values.

use chrono::{DateTime, FixedOffset, TimeZone};
use serde::Serialize;
use tracing::debug;

use crate::calendar::{active_offset, Instant, TimeObject};
use crate::context::{ResolveOptions, TimeContext};
use crate::grain::Grain;
use crate::predicate::Series;
use crate::types::{Direction, TimeData};

// ── Result types ────────────────────────────────────────────────────────────

/// An offset-aware instant and the precision it was stated at.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Moment {
    pub value: DateTime<FixedOffset>,
    pub grain: Grain,
}

/// A resolved occurrence.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TimeValue {
    Instant(Moment),
    Interval {
        from: Moment,
        to: Moment,
    },
    /// One side left unbounded ("after 3pm", "before Monday").
    OpenInterval {
        #[serde(skip_serializing_if = "Option::is_none")]
        from: Option<Moment>,
        #[serde(skip_serializing_if = "Option::is_none")]
        to: Option<Moment>,
    },
}

/// The chosen value and its nearest alternatives, chosen value first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolved {
    pub value: TimeValue,
    pub values: Vec<TimeValue>,
    pub latent: bool,
}

// ── Resolution ──────────────────────────────────────────────────────────────

impl TimeData {
    /// Resolve this value against `ctx`.
    ///
    /// The nearest future occurrence wins. A `not_immediate` value skips a
    /// first occurrence overlapping the reference time when another follows.
    /// With no future occurrence the nearest past one is used. `None` when
    /// the value is latent (and latent values are not wanted) or has no
    /// occurrence within the horizon.
    pub fn resolve(&self, ctx: &TimeContext, options: &ResolveOptions) -> Option<Resolved> {
        if self.latent && !options.with_latent {
            debug!(grain = %self.grain, "resolve: skipping latent value");
            return None;
        }

        let wanted = options.max_values.max(1);
        let Series { past, mut future } = self.ground(ctx);
        let occurrences: Vec<TimeObject> = match future.next() {
            Some(ahead) => {
                let next_ahead = future.next();
                let immediate = self.not_immediate && ahead.intersect(&ctx.reference).is_some();
                let head: Vec<TimeObject> = match next_ahead {
                    Some(next) if immediate => vec![next],
                    next => std::iter::once(ahead).chain(next).collect(),
                };
                head.into_iter().chain(future).take(wanted).collect()
            }
            None => {
                debug!(grain = %self.grain, "resolve: no future occurrence, using past");
                past.take(wanted).collect()
            }
        };

        let Some(first) = occurrences.first() else {
            debug!(grain = %self.grain, "resolve: no occurrence within horizon");
            return None;
        };
        let value = render(first, self.direction, ctx)?;
        let values = occurrences
            .iter()
            .take(options.max_values)
            .filter_map(|t| render(t, self.direction, ctx))
            .collect();
        debug!(start = %first.start, grain = %first.grain, "resolve: picked occurrence");

        Some(Resolved {
            value,
            values,
            latent: self.latent,
        })
    }
}

/// Attach the context timezone's offset in force at a wall-clock instant.
fn localize(ctx: &TimeContext, instant: Instant) -> Option<DateTime<FixedOffset>> {
    let offset = FixedOffset::east_opt(active_offset(&ctx.timezone, instant) * 60)?;
    offset.from_local_datetime(&instant).single()
}

fn render(t: &TimeObject, direction: Option<Direction>, ctx: &TimeContext) -> Option<TimeValue> {
    let start = Moment {
        value: localize(ctx, t.start)?,
        grain: t.grain,
    };
    let value = match (direction, t.end) {
        (Some(Direction::After), _) => TimeValue::OpenInterval {
            from: Some(start),
            to: None,
        },
        (Some(Direction::Before), _) => TimeValue::OpenInterval {
            from: None,
            to: Some(start),
        },
        (None, Some(end)) => TimeValue::Interval {
            from: start,
            to: Moment {
                value: localize(ctx, end)?,
                grain: t.grain,
            },
        },
        (None, None) => TimeValue::Instant(start),
    };
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::production::{
        cycle_n, day_of_week, hour, intersect_dom, mk_latent, month, month_day, with_direction,
        year, year_month_day,
    };
    use crate::compose::intersect;
    use crate::types::Token;

    fn opts() -> ResolveOptions {
        ResolveOptions::default()
    }

    /// Wednesday 2026-02-18, 09:30 in New York.
    fn ny() -> TimeContext {
        TimeContext::from_rfc3339("2026-02-18T14:30:00Z", "America/New_York", &opts()).unwrap()
    }

    fn instant(resolved: &Resolved) -> &Moment {
        match &resolved.value {
            TimeValue::Instant(m) => m,
            other => panic!("expected an instant, got {:?}", other),
        }
    }

    // ── Choice ──────────────────────────────────────────────────────────

    #[test]
    fn test_resolve_picks_nearest_future() {
        let r = hour(false, 15).resolve(&ny(), &opts()).unwrap();
        let m = instant(&r);
        assert_eq!(m.value.to_rfc3339(), "2026-02-18T15:00:00-05:00");
        assert_eq!(m.grain, Grain::Hour);
        assert!(!r.latent);
    }

    #[test]
    fn test_resolve_not_immediate_skips_today() {
        let r = day_of_week(3).resolve(&ny(), &opts()).unwrap();
        assert_eq!(instant(&r).value.to_rfc3339(), "2026-02-25T00:00:00-05:00");
    }

    #[test]
    fn test_resolve_immediate_value_may_be_today() {
        let td = crate::production::today();
        let r = td.resolve(&ny(), &opts()).unwrap();
        assert_eq!(instant(&r).value.to_rfc3339(), "2026-02-18T00:00:00-05:00");
    }

    #[test]
    fn test_resolve_falls_back_to_past() {
        let r = year(2020).resolve(&ny(), &opts()).unwrap();
        assert_eq!(instant(&r).value.to_rfc3339(), "2020-01-01T00:00:00-05:00");
        assert_eq!(r.values.len(), 1);
    }

    #[test]
    fn test_resolve_nothing_in_horizon() {
        assert!(year_month_day(2026, 2, 30).resolve(&ny(), &opts()).is_none());
    }

    #[test]
    fn test_resolve_latent() {
        let td = mk_latent(hour(false, 15));
        assert!(td.resolve(&ny(), &opts()).is_none());
        let with_latent = ResolveOptions {
            with_latent: true,
            ..opts()
        };
        assert!(td.resolve(&ny(), &with_latent).unwrap().latent);
    }

    #[test]
    fn test_resolve_alternatives() {
        let r = hour(false, 15).resolve(&ny(), &opts()).unwrap();
        assert_eq!(r.values.len(), 3);
        assert_eq!(r.values[0], r.value);

        let one = ResolveOptions {
            max_values: 1,
            ..opts()
        };
        assert_eq!(hour(false, 15).resolve(&ny(), &one).unwrap().values.len(), 1);
    }

    // ── Rendering ───────────────────────────────────────────────────────

    #[test]
    fn test_resolve_summer_offset() {
        let td = intersect(&month_day(7, 4), &hour(false, 15));
        let r = td.resolve(&ny(), &opts()).unwrap();
        assert_eq!(instant(&r).value.to_rfc3339(), "2026-07-04T15:00:00-04:00");
    }

    #[test]
    fn test_resolve_interval() {
        let r = cycle_n(false, Grain::Day, 2).resolve(&ny(), &opts()).unwrap();
        match r.value {
            TimeValue::Interval { from, to } => {
                assert_eq!(from.value.to_rfc3339(), "2026-02-18T00:00:00-05:00");
                assert_eq!(to.value.to_rfc3339(), "2026-02-20T00:00:00-05:00");
            }
            other => panic!("expected an interval, got {:?}", other),
        }
    }

    #[test]
    fn test_resolve_open_interval() {
        let after = with_direction(Direction::After, hour(false, 15));
        match after.resolve(&ny(), &opts()).unwrap().value {
            TimeValue::OpenInterval { from: Some(_), to: None } => {}
            other => panic!("expected an open interval, got {:?}", other),
        }
        let before = with_direction(Direction::Before, hour(false, 15));
        match before.resolve(&ny(), &opts()).unwrap().value {
            TimeValue::OpenInterval { from: None, to: Some(_) } => {}
            other => panic!("expected an open interval, got {:?}", other),
        }
    }

    #[test]
    fn test_resolved_json_shape() {
        let td = intersect_dom(&month(3), &Token::Ordinal(3)).unwrap();
        let r = td.resolve(&ny(), &opts()).unwrap();
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["value"]["type"], "instant");
        assert_eq!(json["value"]["value"], "2026-03-03T00:00:00-05:00");
        assert_eq!(json["value"]["grain"], "day");
        assert_eq!(json["latent"], false);
        assert_eq!(json["values"].as_array().unwrap().len(), 3);

        let after = with_direction(Direction::After, hour(false, 15));
        let json = serde_json::to_value(after.resolve(&ny(), &opts()).unwrap()).unwrap();
        assert_eq!(json["value"]["type"], "open_interval");
        assert!(json["value"].get("to").is_none());
    }
}
