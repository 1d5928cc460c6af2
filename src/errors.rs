use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContoTermicoError {
    #[error("Request was considered invalid due to error: {0}")]
    InvalidRequest(#[from] anyhow::Error),
    #[error("Validation failed during incentive calculation: {0}")]
    FailureInCalculation(#[from] CalculationError),
    #[error("Error writing out calculation result: {0}")]
    ErrorInOutput(OutputError),
}

/// A validation failure raised by one of the incentive calculators.
///
/// The calculation aborts at the first failure, so no partial result is ever produced.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum CalculationError {
    /// A tag outside the recognised enumeration for a technology, device, application or system type.
    #[error("Unknown {category}: '{value}'")]
    UnknownCategory {
        category: &'static str,
        value: String,
    },
    /// A power, area or amount outside the range covered by the regulation's tables.
    #[error("{quantity} = {value} is out of range (allowed: {allowed})")]
    OutOfRange {
        quantity: &'static str,
        value: f64,
        allowed: String,
    },
    /// A branch-specific input that the chosen configuration requires was not supplied.
    #[error("Missing required input {field}: {reason}")]
    MissingField {
        field: &'static str,
        reason: &'static str,
    },
}

impl CalculationError {
    pub(crate) fn unknown_category(category: &'static str, value: &str) -> Self {
        Self::UnknownCategory {
            category,
            value: value.to_string(),
        }
    }

    pub(crate) fn out_of_range(quantity: &'static str, value: f64, allowed: impl Into<String>) -> Self {
        Self::OutOfRange {
            quantity,
            value,
            allowed: allowed.into(),
        }
    }

    pub(crate) fn missing_field(field: &'static str, reason: &'static str) -> Self {
        Self::MissingField { field, reason }
    }
}

#[derive(Debug, Error)]
#[error(transparent)]
pub struct OutputError {
    error: anyhow::Error,
}

impl OutputError {
    pub fn new(error: anyhow::Error) -> Self {
        Self { error }
    }
}
