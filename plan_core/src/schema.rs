//! # Module & Parameter Schemas
//!
//! Schemas are the immutable blueprints of the engine: a [`ModuleSchema`]
//! describes one module type (identity, logic plugin, parameters, step
//! pipeline) and a [`ParameterSchema`] describes one configurable value.
//! Once constructed they are read-only and shared across every instance
//! created from them.
//!
//! ## Source Format
//!
//! Schemas deserialize from JSON records. Unrecognized parameter fields are
//! a schema error; `moduleName` and `moduleId` are required; `logic`
//! defaults to the lower-cased `moduleId`; `steps` defaults to empty.
//!
//! ```json
//! {
//!   "moduleName": "Conveyor segment",
//!   "moduleId": "CONVEYOR",
//!   "parameters": {
//!     "supply_voltage": {
//!       "datatype": "text",
//!       "source": ["global"],
//!       "reference": "supply_voltage"
//!     },
//!     "length_m": {
//!       "datatype": "numeric",
//!       "defaultValue": 10.0,
//!       "hardLimits": { "min": 1.0, "max": 200.0 },
//!       "source": ["user"]
//!     }
//!   },
//!   "steps": ["size_power_cable", "select_cabinet_elements"]
//! }
//! ```
//!
//! Note that `hardLimits`/`softLimits` are stored and passed through for
//! presentation layers only. The engine does not enforce them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::{PlanError, PlanResult};
use crate::values::Value;

/// Provenance tag marking a parameter as eligible for global propagation
pub const SOURCE_GLOBAL: &str = "global";

/// Reserved logic name identifying the deferred control-cabinet module
pub const CABINET_LOGIC: &str = "cabinet";

fn default_true() -> bool {
    true
}

// ============================================================================
// ParameterSchema
// ============================================================================

/// Blueprint for one configurable value of a module.
///
/// The `datatype`, limit descriptors, `options` and `editableInFrontend`
/// flag are advisory metadata for presentation layers; the engine stores
/// and forwards them without enforcement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ParameterSchema {
    /// Type tag (e.g. "numeric", "enum", "boolean") - advisory only
    pub datatype: String,

    /// Value used to seed an instance when no override is supplied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,

    /// Hard bounds, stored but never enforced by the engine
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hard_limits: Option<Value>,

    /// Soft bounds, stored but never enforced by the engine
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soft_limits: Option<Value>,

    /// Allowed values for enum-like parameters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<Value>>,

    /// Ordered provenance tags (e.g. "global", "user")
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub source: Vec<String>,

    /// Whether a frontend should offer this parameter for editing
    #[serde(default = "default_true")]
    pub editable_in_frontend: bool,

    /// Name of a global-result parameter to fill this one from when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl ParameterSchema {
    /// True if this parameter carries the `"global"` provenance tag.
    ///
    /// Propagation additionally requires a non-null [`reference`]; a global
    /// tag without one is a no-op.
    ///
    /// [`reference`]: ParameterSchema::reference
    pub fn is_global(&self) -> bool {
        self.source.iter().any(|tag| tag == SOURCE_GLOBAL)
    }
}

// ============================================================================
// ModuleSchema
// ============================================================================

/// Raw deserialization target; normalized into [`ModuleSchema`] so the
/// `logic`/`steps` defaults live in exactly one place.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RawModuleSchema {
    module_name: String,
    module_id: String,
    #[serde(default)]
    logic: Option<String>,
    #[serde(default)]
    parameters: BTreeMap<String, ParameterSchema>,
    #[serde(default)]
    steps: Vec<String>,
}

/// Immutable blueprint for one module type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawModuleSchema")]
pub struct ModuleSchema {
    /// Display name (e.g. "Conveyor segment")
    pub module_name: String,

    /// Stable identity (e.g. "CONVEYOR")
    pub module_id: String,

    /// Name of the logic plugin implementing this module's steps
    pub logic: String,

    /// Parameter blueprints, keyed by unique parameter name
    pub parameters: BTreeMap<String, ParameterSchema>,

    /// Ordered step pipeline; each name must resolve on the logic plugin
    pub steps: Vec<String>,
}

impl From<RawModuleSchema> for ModuleSchema {
    fn from(raw: RawModuleSchema) -> Self {
        let logic = raw
            .logic
            .unwrap_or_else(|| raw.module_id.to_lowercase());
        ModuleSchema {
            module_name: raw.module_name,
            module_id: raw.module_id,
            logic,
            parameters: raw.parameters,
            steps: raw.steps,
        }
    }
}

impl ModuleSchema {
    /// Construct a schema from an in-memory JSON value.
    ///
    /// Missing `moduleName`/`moduleId` or unrecognized parameter fields
    /// surface as [`PlanError::Schema`].
    pub fn from_value(value: Value) -> PlanResult<Self> {
        let module = value
            .get("moduleId")
            .and_then(Value::as_str)
            .unwrap_or("<unknown>")
            .to_string();
        serde_json::from_value(value).map_err(|e| PlanError::schema(module, e.to_string()))
    }

    /// Construct a schema from a JSON string
    pub fn from_json_str(json: &str) -> PlanResult<Self> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| PlanError::schema("<unknown>", e.to_string()))?;
        Self::from_value(value)
    }

    /// True if this schema describes the deferred control-cabinet module
    pub fn is_cabinet(&self) -> bool {
        self.logic == CABINET_LOGIC
    }
}
