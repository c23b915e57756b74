//! Typed result for pipeline steps that may fall back instead of failing.

/// Outcome of a best-effort step.
///
/// Hard failures are reported through `Result::Err` by the caller; this type
/// only separates a clean result from a fallback value used after a soft
/// failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome<T> {
    /// The step completed normally.
    Ok(T),
    /// The step failed and `value` is the fallback.
    Degraded { value: T, reason: String },
}

impl<T> StepOutcome<T> {
    /// Build a degraded outcome from a fallback value and an error.
    pub fn degraded(value: T, reason: impl std::fmt::Display) -> Self {
        Self::Degraded {
            value,
            reason: reason.to_string(),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }

    /// Borrow the value regardless of how it was produced.
    pub fn value(&self) -> &T {
        match self {
            Self::Ok(value) | Self::Degraded { value, .. } => value,
        }
    }

    /// Failure reason, if the step degraded.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Ok(_) => None,
            Self::Degraded { reason, .. } => Some(reason.as_str()),
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Self::Ok(value) | Self::Degraded { value, .. } => value,
        }
    }
}
