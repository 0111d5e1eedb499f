//! # Logic Plugins
//!
//! A logic plugin supplies the step implementations for one module type.
//! Module schemas name their plugin through the `logic` field and list the
//! steps to run; the engine resolves both by name against the read-only
//! [`registry::LogicRegistry`] built at startup.
//!
//! Each step is a plain function: value map in, value map out. Steps must
//! not fail for well-formed, in-range input; for out-of-range input they
//! return a [`StepError`], which the engine treats as fatal for the whole
//! project run.
//!
//! ## Built-in Plugins
//!
//! - [`global`] - normalizes project-wide supply parameters
//! - [`conveyor`] - motor current estimation and power-cable sizing for one
//!   conveyor segment
//! - [`splitter`] - cable sizing for a multi-drive line splitter
//! - [`cabinet`] - deferred control-cabinet sizing from aggregated loads
//!
//! Shared electrical arithmetic lives in [`electrical`].

pub mod cabinet;
pub mod conveyor;
pub mod electrical;
pub mod global;
pub mod registry;
pub mod splitter;

use thiserror::Error;

use crate::values::ValueMap;

pub use registry::LogicRegistry;

/// Error raised inside a step implementation.
///
/// Carries no module context; the engine wraps it with the owning module id
/// and step name when it surfaces as a [`crate::errors::PlanError`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StepError {
    /// The input is outside the plugin's supported domain
    #[error("{reason}")]
    Domain { reason: String },

    /// A required input value is absent or of the wrong shape
    #[error("missing or malformed input '{field}'")]
    MissingInput { field: String },
}

impl StepError {
    /// Create a Domain error
    pub fn domain(reason: impl Into<String>) -> Self {
        StepError::Domain {
            reason: reason.into(),
        }
    }

    /// Create a MissingInput error
    pub fn missing_input(field: impl Into<String>) -> Self {
        StepError::MissingInput {
            field: field.into(),
        }
    }
}

/// Result of one step invocation
pub type StepResult = Result<ValueMap, StepError>;

/// One named unit of computation within a module's pipeline
pub type StepFn = fn(ValueMap) -> StepResult;

/// Interface implemented by every logic plugin.
///
/// `step` resolves a declared step name to its implementation; `None` means
/// the schema references a step this plugin does not provide, which the
/// engine reports as a fatal `StepNotFound`.
pub trait LogicPlugin: Send + Sync {
    /// Registry name of this plugin (matched against a schema's `logic`)
    fn name(&self) -> &'static str;

    /// Resolve a step implementation by name
    fn step(&self, name: &str) -> Option<StepFn>;
}

// ============================================================================
// Shared input helpers for the built-in plugins
// ============================================================================

/// Read a required numeric input
pub(crate) fn require_f64(values: &ValueMap, field: &str) -> Result<f64, StepError> {
    values
        .get_f64(field)
        .ok_or_else(|| StepError::missing_input(field))
}

/// Read an optional numeric input, falling back to a default
pub(crate) fn f64_or(values: &ValueMap, field: &str, default: f64) -> f64 {
    values.get_f64(field).unwrap_or(default)
}

/// Read a required supply-voltage input.
///
/// Accepts either a number or the conventional string form with a trailing
/// unit (e.g. `"400V"`).
pub(crate) fn require_voltage(values: &ValueMap, field: &str) -> Result<f64, StepError> {
    match values.get(field) {
        Some(value) => electrical::parse_voltage(value)
            .ok_or_else(|| StepError::domain(format!("'{field}' is not a valid voltage"))),
        None => Err(StepError::missing_input(field)),
    }
}

/// Round to two decimals for reported results
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_require_voltage_accepts_number_and_string() {
        let mut values = ValueMap::new();
        values.insert("u1", json!("400V"));
        values.insert("u2", json!(230.0));
        values.insert("u3", json!("not a voltage"));

        assert_eq!(require_voltage(&values, "u1").unwrap(), 400.0);
        assert_eq!(require_voltage(&values, "u2").unwrap(), 230.0);
        assert!(matches!(
            require_voltage(&values, "u3").unwrap_err(),
            StepError::Domain { .. }
        ));
        assert_eq!(
            require_voltage(&values, "missing").unwrap_err(),
            StepError::missing_input("missing")
        );
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(10.525_3), 10.53);
        assert_eq!(round2(0.004), 0.0);
    }
}
