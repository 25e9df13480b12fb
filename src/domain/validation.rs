use super::SolveFor;

/// A caller-correctable problem with a request, reported before any
/// iteration starts.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// A parameter that must be strictly positive was zero or negative.
    #[error("{field} must be greater than zero (got {value})")]
    NotPositive {
        /// Name of the offending parameter.
        field: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// A parameter that must be zero or positive was negative.
    #[error("{field} must not be negative (got {value})")]
    Negative {
        /// Name of the offending parameter.
        field: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// A parameter was NaN or infinite.
    #[error("{field} must be a finite number")]
    NotFinite {
        /// Name of the offending parameter.
        field: &'static str,
    },

    /// The selected solve mode needs a value the request did not provide.
    #[error("{field} is required to solve for {mode}")]
    Missing {
        /// Name of the missing value.
        field: &'static str,
        /// The requested solve mode.
        mode: SolveFor,
    },

    /// The solve mode does not apply to the section shape.
    #[error("cannot solve for {mode} on a {shape} section")]
    UnsupportedMode {
        /// The requested solve mode.
        mode: SolveFor,
        /// The section shape.
        shape: &'static str,
    },

    /// An irregular section needs at least two points to form a segment.
    #[error("irregular sections need at least 2 station/elevation points (got {0})")]
    TooFewPoints(usize),

    /// The section cannot carry flow (e.g. zero width and vertical walls).
    #[error("degenerate section: {0}")]
    Degenerate(&'static str),
}

/// Rejects NaN and infinite values.
pub(crate) fn finite(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ValidationError::NotFinite { field })
    }
}

/// Accepts only finite values strictly greater than zero.
pub(crate) fn positive(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    if finite(field, value)? > 0.0 {
        Ok(value)
    } else {
        Err(ValidationError::NotPositive { field, value })
    }
}

/// Accepts finite values greater than or equal to zero.
pub(crate) fn non_negative(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    if finite(field, value)? >= 0.0 {
        Ok(value)
    } else {
        Err(ValidationError::Negative { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_rejects_zero() {
        assert_eq!(
            positive("slope", 0.0),
            Err(ValidationError::NotPositive {
                field: "slope",
                value: 0.0
            })
        );
    }

    #[test]
    fn positive_rejects_nan() {
        assert_eq!(
            positive("slope", f64::NAN),
            Err(ValidationError::NotFinite { field: "slope" })
        );
    }

    #[test]
    fn non_negative_accepts_zero() {
        assert_eq!(non_negative("bottom width", 0.0), Ok(0.0));
        assert!(non_negative("bottom width", -1.0).is_err());
    }

    #[test]
    fn error_display() {
        let error = ValidationError::Missing {
            field: "discharge",
            mode: SolveFor::Depth,
        };
        assert_eq!(error.to_string(), "discharge is required to solve for depth");

        let error = ValidationError::TooFewPoints(1);
        assert_eq!(
            error.to_string(),
            "irregular sections need at least 2 station/elevation points (got 1)"
        );
    }
}
