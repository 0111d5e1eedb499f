//! # Error Types
//!
//! Structured error types for plan_core. A project run either produces a
//! complete result or fails with one of these errors naming the module and
//! step where things went wrong - there is no retry policy and no partial
//! output, since a project result with silently-skipped modules would be
//! unsafe to act on.
//!
//! ## Example
//!
//! ```rust
//! use plan_core::errors::{PlanError, PlanResult};
//!
//! fn resolve_plugin(name: &str) -> PlanResult<()> {
//!     Err(PlanError::logic_not_found(name))
//! }
//!
//! let err = resolve_plugin("unknown").unwrap_err();
//! assert_eq!(err.error_code(), "LOGIC_NOT_FOUND");
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for plan_core operations
pub type PlanResult<T> = Result<T, PlanError>;

/// Structured error type for the composition engine.
///
/// Each variant provides specific context about what went wrong,
/// enabling programmatic error handling by frontends and other consumers.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum PlanError {
    /// A module or parameter definition is malformed (construction time)
    #[error("Schema error in module '{module}': {reason}")]
    Schema { module: String, reason: String },

    /// The logic plugin named by a module schema is not registered
    #[error("Logic plugin not found: '{logic}'")]
    LogicNotFound { logic: String },

    /// A declared step has no implementation on the resolved logic plugin
    #[error("Step '{step}' not found on logic plugin '{logic}'")]
    StepNotFound { logic: String, step: String },

    /// A logic plugin rejected its input (out of range, no feasible size, etc.)
    #[error("Computation failed in module '{module}', step '{step}': {reason}")]
    Computation {
        module: String,
        step: String,
        reason: String,
    },

    /// A step's required input is absent or of the wrong shape
    #[error("Missing input '{field}' in module '{module}', step '{step}'")]
    MissingInput {
        module: String,
        step: String,
        field: String,
    },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },
}

impl PlanError {
    /// Create a Schema error
    pub fn schema(module: impl Into<String>, reason: impl Into<String>) -> Self {
        PlanError::Schema {
            module: module.into(),
            reason: reason.into(),
        }
    }

    /// Create a LogicNotFound error
    pub fn logic_not_found(logic: impl Into<String>) -> Self {
        PlanError::LogicNotFound {
            logic: logic.into(),
        }
    }

    /// Create a StepNotFound error
    pub fn step_not_found(logic: impl Into<String>, step: impl Into<String>) -> Self {
        PlanError::StepNotFound {
            logic: logic.into(),
            step: step.into(),
        }
    }

    /// Create a Computation error
    pub fn computation(
        module: impl Into<String>,
        step: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        PlanError::Computation {
            module: module.into(),
            step: step.into(),
            reason: reason.into(),
        }
    }

    /// Create a MissingInput error
    pub fn missing_input(
        module: impl Into<String>,
        step: impl Into<String>,
        field: impl Into<String>,
    ) -> Self {
        PlanError::MissingInput {
            module: module.into(),
            step: step.into(),
            field: field.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(
        operation: impl Into<String>,
        path: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        PlanError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            PlanError::Schema { .. } => "SCHEMA_ERROR",
            PlanError::LogicNotFound { .. } => "LOGIC_NOT_FOUND",
            PlanError::StepNotFound { .. } => "STEP_NOT_FOUND",
            PlanError::Computation { .. } => "COMPUTATION_FAILED",
            PlanError::MissingInput { .. } => "MISSING_INPUT",
            PlanError::FileError { .. } => "FILE_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = PlanError::computation("C1", "size_power_cable", "no feasible cross-section");
        let json = serde_json::to_string(&error).unwrap();
        let roundtrip: PlanError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            PlanError::logic_not_found("conveyor").error_code(),
            "LOGIC_NOT_FOUND"
        );
        assert_eq!(
            PlanError::step_not_found("conveyor", "size_power_cable").error_code(),
            "STEP_NOT_FOUND"
        );
        assert_eq!(PlanError::schema("X", "bad field").error_code(), "SCHEMA_ERROR");
    }

    #[test]
    fn test_error_display_names_module_and_step() {
        let error = PlanError::missing_input("S1", "size_drives", "motor_power_kw");
        let text = error.to_string();
        assert!(text.contains("S1"));
        assert!(text.contains("size_drives"));
        assert!(text.contains("motor_power_kw"));
    }
}
