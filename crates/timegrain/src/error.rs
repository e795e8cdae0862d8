//! Error types for timegrain configuration and parsing.
//!
//! The predicate algebra never fails: an inapplicable or exhausted
//! construction is an absent value or an empty series. These errors only
//! surface at the boundary where callers hand in strings or horizons.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimeError {
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid datetime: {0}")]
    InvalidDatetime(String),

    #[error("Invalid horizon: {0}")]
    InvalidHorizon(String),
}

pub type Result<T> = std::result::Result<T, TimeError>;
