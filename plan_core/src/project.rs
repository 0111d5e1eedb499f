//! # Project Orchestration
//!
//! A [`Project`] ties one global module instance to an ordered list of
//! domain module instances and runs them as a single linear pass:
//!
//! 1. **Phase G** - run the global instance; its result becomes the source
//!    of truth for global propagation.
//! 2. **Phase D** - for every non-cabinet instance in list order: propagate
//!    globals, run the pipeline, collect reserved aggregation keys into an
//!    [`Aggregates`] snapshot.
//! 3. **Phase C** - if a cabinet instance is present, inject the snapshot
//!    into its values, propagate globals, run it, and append its result
//!    last - regardless of where it sat in the input list.
//!
//! A run either yields a complete [`ProjectResult`] or fails with the first
//! error; there are no partial results.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use plan_core::logic::LogicRegistry;
//! use plan_core::project::Project;
//! use plan_core::schema::ModuleSchema;
//! use serde_json::json;
//!
//! let global = Arc::new(ModuleSchema::from_value(json!({
//!     "moduleName": "Project globals",
//!     "moduleId": "GLOBAL",
//!     "parameters": {
//!         "supply_voltage": { "datatype": "text", "defaultValue": "400V" }
//!     },
//!     "steps": ["parse_supply_voltage"],
//! })).unwrap());
//!
//! let project = Project::new("Jane Engineer", "25-117", "Acme Intralogistics", global);
//! let result = project.run(LogicRegistry::builtin()).unwrap();
//! assert_eq!(result.global.get_f64("supply_voltage_v"), Some(400.0));
//! assert!(result.modules.is_empty());
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::{PlanError, PlanResult};
use crate::instance::ModuleInstance;
use crate::logic::cabinet::{
    KEY_CABINET_ELEMENTS, KEY_MOTOR_CURRENTS, KEY_MOTOR_OPERATING_LOADS, KEY_MOTOR_RATED_LOADS,
};
use crate::logic::LogicRegistry;
use crate::schema::ModuleSchema;
use crate::values::{Value, ValueMap, KEY_ORIGIN};

/// Current schema version for serialized project results
pub const SCHEMA_VERSION: &str = "0.1.0";

// ============================================================================
// Metadata & result types
// ============================================================================

/// Identifying metadata carried on every project result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectMetadata {
    /// Result schema version
    pub version: String,
    /// Responsible engineer
    pub engineer: String,
    /// Job/project number (e.g. "25-117")
    pub job_id: String,
    /// Client name
    pub client: String,
    /// When the project container was created
    pub created: DateTime<Utc>,
}

/// Result of one domain module instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleResult {
    /// Stable identity from the module schema
    pub module_id: String,
    /// Display name from the module schema
    pub module_name: String,
    /// Final value map after the pipeline ran
    pub values: ValueMap,
}

/// Complete result of one orchestration run.
///
/// Domain results keep input order, except that the cabinet result (if any)
/// is always last.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectResult {
    /// Project metadata
    pub meta: ProjectMetadata,
    /// Final value map of the global instance
    pub global: ValueMap,
    /// Ordered domain results
    pub modules: Vec<ModuleResult>,
}

// ============================================================================
// Aggregates (fan-in snapshot)
// ============================================================================

/// Fan-in of reserved aggregation keys across all non-cabinet results.
///
/// Built during Phase D and injected into the cabinet instance as an
/// immutable snapshot before Phase C. Values are collected in execution
/// order; duplicates are preserved, never deduplicated.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Aggregates {
    /// Cabinet elements grouped by originating module, `origin` tag stripped
    pub cabinet_elements: BTreeMap<String, Vec<Value>>,
    /// Every reported motor rated current, in amperes
    pub motor_currents: Vec<f64>,
    /// Every reported motor rated load, in kW
    pub motor_rated_loads: Vec<f64>,
    /// Every reported motor operating load, in kW
    pub motor_operating_loads: Vec<f64>,
}

impl Aggregates {
    /// Collect the reserved keys of one module result.
    ///
    /// `module_id` is the fallback origin for cabinet elements that carry
    /// no `origin` tag of their own.
    fn collect(&mut self, module_id: &str, result: &ValueMap) {
        for element in result.cabinet_elements() {
            let mut element = element.clone();
            let origin = element
                .as_object_mut()
                .and_then(|fields| fields.remove(KEY_ORIGIN))
                .and_then(|tag| tag.as_str().map(str::to_string))
                .unwrap_or_else(|| module_id.to_string());
            self.cabinet_elements.entry(origin).or_default().push(element);
        }
        if let Some(current) = result.motor_rated_current() {
            self.motor_currents.push(current);
        }
        self.motor_currents.extend(result.drive_currents());
        if let Some(load) = result.motor_rated_load() {
            self.motor_rated_loads.push(load);
        }
        if let Some(load) = result.motor_operating_load() {
            self.motor_operating_loads.push(load);
        }
    }

    /// Inject the snapshot into a cabinet instance's value map, overwriting
    /// any prior values under the injection keys.
    fn inject(&self, values: &mut ValueMap) {
        let grouped = Value::Object(
            self.cabinet_elements
                .iter()
                .map(|(origin, elements)| (origin.clone(), Value::Array(elements.clone())))
                .collect(),
        );
        values.insert(KEY_CABINET_ELEMENTS, grouped);
        values.insert(KEY_MOTOR_CURRENTS, numbers(&self.motor_currents));
        values.insert(KEY_MOTOR_RATED_LOADS, numbers(&self.motor_rated_loads));
        values.insert(
            KEY_MOTOR_OPERATING_LOADS,
            numbers(&self.motor_operating_loads),
        );
    }
}

fn numbers(values: &[f64]) -> Value {
    Value::Array(values.iter().copied().map(Value::from).collect())
}

// ============================================================================
// Project
// ============================================================================

/// One global instance plus an ordered list of domain instances
#[derive(Debug, Clone)]
pub struct Project {
    meta: ProjectMetadata,
    global: ModuleInstance,
    modules: Vec<ModuleInstance>,
}

impl Project {
    /// Create a project around a global module schema.
    ///
    /// # Arguments
    ///
    /// * `engineer` - Name of the responsible engineer
    /// * `job_id` - Job/project number (e.g. "25-117")
    /// * `client` - Client name
    /// * `global_schema` - Schema of the global module
    pub fn new(
        engineer: impl Into<String>,
        job_id: impl Into<String>,
        client: impl Into<String>,
        global_schema: Arc<ModuleSchema>,
    ) -> Self {
        Project {
            meta: ProjectMetadata {
                version: SCHEMA_VERSION.to_string(),
                engineer: engineer.into(),
                job_id: job_id.into(),
                client: client.into(),
                created: Utc::now(),
            },
            global: ModuleInstance::new(global_schema),
            modules: Vec::new(),
        }
    }

    /// Append a domain module instance built from a schema and optional
    /// overrides.
    ///
    /// At most one cabinet module is allowed per project; a second one is a
    /// schema error.
    pub fn add_module(
        &mut self,
        schema: Arc<ModuleSchema>,
        overrides: Option<&ValueMap>,
    ) -> PlanResult<()> {
        if schema.is_cabinet() && self.modules.iter().any(|m| m.schema().is_cabinet()) {
            return Err(PlanError::schema(
                &schema.module_id,
                "a project may contain at most one cabinet module",
            ));
        }
        let instance = match overrides {
            Some(overrides) => ModuleInstance::with_overrides(schema, overrides),
            None => ModuleInstance::new(schema),
        };
        self.modules.push(instance);
        Ok(())
    }

    /// Number of domain module instances
    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    /// Run the whole project once, consuming it.
    ///
    /// Executes the three phases described in the module docs. Fails fast:
    /// the first schema, resolution, or computation error aborts the run
    /// and no result is produced.
    pub fn run(self, registry: &LogicRegistry) -> PlanResult<ProjectResult> {
        info!(
            job_id = %self.meta.job_id,
            modules = self.modules.len(),
            "project run start"
        );

        // Phase G: the global result is the source of truth for propagation
        let global = self.global.run(registry)?;

        // Phase D: run non-cabinet instances in input order, collecting the
        // fan-in snapshot as results come in
        let mut results = Vec::with_capacity(self.modules.len());
        let mut aggregates = Aggregates::default();
        let mut cabinet: Option<ModuleInstance> = None;
        for mut instance in self.modules {
            if instance.schema().is_cabinet() {
                cabinet = Some(instance);
                continue;
            }
            instance.apply_globals(&global);
            let module_id = instance.schema().module_id.clone();
            let module_name = instance.schema().module_name.clone();
            let values = instance.run(registry)?;
            aggregates.collect(&module_id, &values);
            debug!(module = %module_id, "module complete");
            results.push(ModuleResult {
                module_id,
                module_name,
                values,
            });
        }

        // Phase C: the cabinet consumes the finished snapshot and runs last
        if let Some(mut instance) = cabinet {
            aggregates.inject(instance.values_mut());
            instance.apply_globals(&global);
            let module_id = instance.schema().module_id.clone();
            let module_name = instance.schema().module_name.clone();
            let values = instance.run(registry)?;
            debug!(module = %module_id, "cabinet complete");
            results.push(ModuleResult {
                module_id,
                module_name,
                values,
            });
        }

        info!(job_id = %self.meta.job_id, "project run complete");
        Ok(ProjectResult {
            meta: self.meta,
            global,
            modules: results,
        })
    }
}
