/// Failures raised by the simulation engine.
///
/// Only malformed input is an error. An unreachable or unprofitable target is a
/// valid computation and surfaces as a [`crate::viability::ViabilityAlert`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimulationError {
    #[error("invalid input `{field}`: {reason}")]
    InvalidInput { field: String, reason: String },
}

impl SimulationError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn field(&self) -> &str {
        match self {
            Self::InvalidInput { field, .. } => field,
        }
    }
}

pub type EngineResult<T> = Result<T, SimulationError>;

pub(crate) fn ensure_finite(field: &str, value: f64) -> EngineResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SimulationError::invalid(field, "must be a finite number"))
    }
}

pub(crate) fn ensure_non_negative(field: &str, value: f64) -> EngineResult<f64> {
    let value = ensure_finite(field, value)?;
    if value < 0.0 {
        return Err(SimulationError::invalid(
            field,
            format!("must be >= 0, got {value}"),
        ));
    }
    Ok(value)
}

pub(crate) fn ensure_positive(field: &str, value: f64) -> EngineResult<f64> {
    let value = ensure_finite(field, value)?;
    if value <= 0.0 {
        return Err(SimulationError::invalid(
            field,
            format!("must be > 0, got {value}"),
        ));
    }
    Ok(value)
}

/// A class cannot exist with fewer than one effective student.
pub(crate) fn ensure_average(field: &str, value: f64) -> EngineResult<f64> {
    let value = ensure_finite(field, value)?;
    if value < 1.0 {
        return Err(SimulationError::invalid(
            field,
            format!("average students per class must be >= 1, got {value}"),
        ));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_names_the_field() {
        let err = ensure_positive("ticket_price", 0.0).unwrap_err();
        assert_eq!(err.field(), "ticket_price");
        assert!(err.to_string().contains("ticket_price"));
    }

    #[test]
    fn averages_below_one_are_rejected() {
        assert!(ensure_average("current_average", 0.99).is_err());
        assert_eq!(ensure_average("current_average", 1.0), Ok(1.0));
    }

    #[test]
    fn non_finite_values_are_rejected() {
        assert!(ensure_non_negative("fixed_costs", f64::NAN).is_err());
        assert!(ensure_non_negative("fixed_costs", f64::INFINITY).is_err());
        assert_eq!(ensure_non_negative("fixed_costs", 0.0), Ok(0.0));
    }
}
