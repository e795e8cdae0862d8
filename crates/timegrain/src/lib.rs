//! # timegrain
//!
//! Compositional temporal predicates for natural-language time expressions.
//!
//! A handful of primitives (calendar cycles, fixed calendar fields, indexed
//! selection, intersection, duration and timezone shifts, intervals) compose
//! into trees describing phrases like "the first Monday of March" or "3pm
//! CET". Grounding a tree against a reference time yields lazy, horizon-bounded
//! streams of occurrences on both sides of it; resolution picks the answer.
//!
//! ## Modules
//!
//! - [`grain`] — Calendar units, finest to coarsest
//! - [`calendar`] — Wall-clock arithmetic, `TimeObject`, timezone lookup
//! - [`context`] — Reference time, timezone and search horizon
//! - [`predicate`] — The `Predicate` trait and its occurrence streams
//! - [`cycle`] — Every whole grain ("each day")
//! - [`field`] — Fixed calendar fields ("3pm", "the 13th", "March")
//! - [`select`] — Pick occurrences by index (`takeNth`, `takeN`, ...)
//! - [`compose`] — Intersection and interval construction
//! - [`shift`] — Duration and timezone shifts
//! - [`types`] — `TimeData`, `Form`, `Direction`, `DurationData`, `Token`
//! - [`classify`] — Token tests consumed by grammar rules
//! - [`production`] — Builders assembling `TimeData` values
//! - [`resolve`] — Choosing and rendering the answer
//! - [`error`] — Error types

pub mod calendar;
pub mod classify;
pub mod compose;
pub mod context;
pub mod cycle;
pub mod error;
pub mod field;
pub mod grain;
pub mod predicate;
pub mod production;
pub mod resolve;
pub mod select;
pub mod shift;
pub mod types;

pub use calendar::{
    build_interval, parse_timezone, resolve_timezone_name, Instant, IntervalType, TimeObject,
    WeekStartDay,
};
pub use compose::{intersect, interval};
pub use context::{ResolveOptions, TimeContext};
pub use cycle::cycle;
pub use error::TimeError;
pub use grain::Grain;
pub use predicate::{evaluate, Pred, Predicate, Series, TimeSeq};
pub use resolve::{Moment, Resolved, TimeValue};
pub use select::{take_last_of, take_n, take_nth, take_nth_after};
pub use shift::{shift_duration, shift_timezone};
pub use types::{extract_int, Direction, DurationData, Form, TimeData, Token};
