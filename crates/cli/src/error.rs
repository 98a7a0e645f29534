//! CLI error types.

use domain::DischargeError;
use station::StationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    /// A `--fill` argument was not of the form `TANK=LITERS`.
    #[error("Invalid fill '{0}': expected TANK=LITERS")]
    InvalidFill(String),

    #[error(transparent)]
    Discharge(#[from] DischargeError),

    #[error(transparent)]
    Station(#[from] StationError),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidFill(_) => 2,
            CliError::Discharge(err) if err.is_retryable() => 75,
            CliError::Discharge(_) | CliError::Station(_) => 1,
        }
    }
}
