use thiserror::Error;

/// Failures of the pure model. Every operation either yields a full
/// result or one of these; nothing is ever partially computed.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    #[error("non-positive elapsed days since origin: {days}")]
    NonPositiveElapsedDays { days: f64 },

    #[error("power-law evaluation overflowed (days={days}, exponent={exponent})")]
    NonFiniteResult { days: f64, exponent: f64 },

    #[error("missing upstream data: {0}")]
    MissingInput(&'static str),

    #[error("invalid parameter {name}={value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("allocation share must be in (0, 1], got {0}")]
    InvalidShare(f64),

    #[error("invalid halving schedule: {0}")]
    InvalidSchedule(&'static str),
}

pub type ModelResult<T> = Result<T, ModelError>;
