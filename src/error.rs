//! Error types for the clinic staffing optimizer.

use thiserror::Error;

use crate::solver::SolverStatus;

/// Every failure that can abort a scheduling run.
///
/// None of these are recoverable for the current run: validation happens
/// before the model is built and a report is only rendered from a complete
/// comparison.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The input tables or the manual schedule are malformed.
    #[error("Configuration error at '{key}': {message}")]
    Config {
        /// The offending key (shift id, professional id, type name, ...).
        key: String,
        /// What is wrong with it.
        message: String,
    },

    /// The solver did not return a usable solution.
    #[error("Solver finished with status {status}: {message}")]
    Solver {
        /// Terminal status reported by the solver.
        status: SolverStatus,
        /// Solver-side detail.
        message: String,
    },

    /// The manual schedule breaks availability or room caps and the run was
    /// configured to reject such schedules.
    #[error("Manual schedule rejected: {count} constraint violation(s), first: {first}")]
    ManualRejected {
        /// Number of violations found.
        count: usize,
        /// Rendering of the first violation.
        first: String,
    },

    /// A request document could not be read or parsed.
    #[error("Failed to read input '{path}': {message}")]
    Input {
        /// Path of the input document.
        path: String,
        /// Underlying reason.
        message: String,
    },

    #[error("Failed to render report: {0}")]
    Render(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SchedulerError {
    pub(crate) fn config(key: impl Into<String>, message: impl Into<String>) -> Self {
        SchedulerError::Config {
            key: key.into(),
            message: message.into(),
        }
    }
}

pub type SchedulerResult<T> = Result<T, SchedulerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_names_key() {
        let error = SchedulerError::config("T13", "unknown shift in demand table");
        assert_eq!(
            error.to_string(),
            "Configuration error at 'T13': unknown shift in demand table"
        );
    }

    #[test]
    fn solver_error_shows_status() {
        let error = SchedulerError::Solver {
            status: SolverStatus::Infeasible,
            message: "no feasible assignment".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Solver finished with status Infeasible: no feasible assignment"
        );
    }

    #[test]
    fn manual_rejected_shows_count() {
        let error = SchedulerError::ManualRejected {
            count: 2,
            first: "PS1 works 7 shifts, availability is 6".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Manual schedule rejected: 2 constraint violation(s), first: PS1 works 7 shifts, availability is 6"
        );
    }

    #[test]
    fn io_errors_convert_with_question_mark() {
        fn fails() -> SchedulerResult<()> {
            std::fs::read_to_string("/nonexistent/clinic-request.json")?;
            Ok(())
        }
        assert!(matches!(fails(), Err(SchedulerError::Io(_))));
    }
}
