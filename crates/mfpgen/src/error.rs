//! Error type shared by seed derivation and instance synthesis.

use std::fmt;

/// Failures surfaced at the boundary of a derivation or synthesis call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GenError {
    /// Malformed or infeasible parameters (scale, delta bounds, root degree, grid).
    InvalidConfiguration { reason: String },
    /// The instance generator ran out of draws.
    GeneratorExhausted,
    /// A recorded batch does not match the batch shape requested for replay.
    ReproductionMismatch { reason: String },
}

impl GenError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            reason: reason.into(),
        }
    }

    pub fn mismatch(reason: impl Into<String>) -> Self {
        Self::ReproductionMismatch {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for GenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfiguration { reason } => write!(f, "invalid configuration: {reason}"),
            Self::GeneratorExhausted => write!(f, "instance generator exhausted"),
            Self::ReproductionMismatch { reason } => write!(f, "reproduction mismatch: {reason}"),
        }
    }
}

impl std::error::Error for GenError {}

pub type Result<T> = std::result::Result<T, GenError>;
