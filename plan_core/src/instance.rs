//! # Module Instances
//!
//! A [`ModuleInstance`] binds an immutable [`ModuleSchema`] to concrete
//! current values: schema defaults seeded first, then caller-supplied
//! overrides entry by entry (overrides win outright). Running an instance
//! threads its value map through the schema's step pipeline in declared
//! order and consumes the instance - no cross-run state survives.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use plan_core::instance::ModuleInstance;
//! use plan_core::logic::LogicRegistry;
//! use plan_core::schema::ModuleSchema;
//! use plan_core::values::ValueMap;
//! use serde_json::json;
//!
//! let schema = Arc::new(ModuleSchema::from_value(json!({
//!     "moduleName": "Conveyor segment",
//!     "moduleId": "CONVEYOR",
//!     "parameters": {
//!         "supply_voltage": { "datatype": "text", "defaultValue": "400V" },
//!         "length_m": { "datatype": "numeric", "defaultValue": 10.0 },
//!         "avg_cable_length_m": { "datatype": "numeric", "defaultValue": 15.0 },
//!         "motor_power_kw": { "datatype": "numeric", "defaultValue": 5.5 },
//!         "max_voltage_drop_percent": { "datatype": "numeric", "defaultValue": 3.0 }
//!     },
//!     "steps": ["size_power_cable"],
//! })).unwrap());
//!
//! let mut overrides = ValueMap::new();
//! overrides.insert("length_m", json!(25.0));
//!
//! let instance = ModuleInstance::with_overrides(schema, &overrides);
//! let result = instance.run(LogicRegistry::builtin()).unwrap();
//! assert_eq!(result.get_f64("power_cable_length_m"), Some(40.0));
//! ```

use std::sync::Arc;

use tracing::{debug, trace};

use crate::errors::{PlanError, PlanResult};
use crate::logic::{LogicRegistry, StepError};
use crate::schema::ModuleSchema;
use crate::values::ValueMap;

/// Runtime binding of a module schema to concrete values
#[derive(Debug, Clone)]
pub struct ModuleInstance {
    schema: Arc<ModuleSchema>,
    values: ValueMap,
}

impl ModuleInstance {
    /// Create an instance seeded from schema defaults only
    pub fn new(schema: Arc<ModuleSchema>) -> Self {
        Self::with_overrides(schema, &ValueMap::new())
    }

    /// Create an instance seeded from schema defaults, then overrides.
    ///
    /// Overrides are applied verbatim on top of the defaults; parameters
    /// without a default and without an override start out absent.
    pub fn with_overrides(schema: Arc<ModuleSchema>, overrides: &ValueMap) -> Self {
        let mut values = ValueMap::new();
        for (name, param) in &schema.parameters {
            if let Some(default) = &param.default_value {
                values.insert(name.clone(), default.clone());
            }
        }
        for (name, value) in overrides.iter() {
            values.insert(name.clone(), value.clone());
        }
        ModuleInstance { schema, values }
    }

    /// The schema this instance was created from
    pub fn schema(&self) -> &ModuleSchema {
        &self.schema
    }

    /// Current values
    pub fn values(&self) -> &ValueMap {
        &self.values
    }

    /// Mutable access for orchestrator-side injection
    pub fn values_mut(&mut self) -> &mut ValueMap {
        &mut self.values
    }

    /// Fill absent values from the global module's result.
    ///
    /// A parameter participates when its schema carries the `"global"`
    /// provenance tag *and* a reference into the global result. Values that
    /// are already set are never replaced - an override always wins - and a
    /// reference missing from the global result is a no-op, not an error.
    pub fn apply_globals(&mut self, global: &ValueMap) {
        for (name, param) in &self.schema.parameters {
            if !param.is_global() {
                continue;
            }
            let Some(reference) = &param.reference else {
                continue;
            };
            if self.values.is_set(name) {
                continue;
            }
            if let Some(value) = global.get(reference) {
                trace!(
                    module = %self.schema.module_id,
                    parameter = %name,
                    reference = %reference,
                    "filled from global result"
                );
                self.values.insert(name.clone(), value.clone());
            }
        }
    }

    /// Execute the step pipeline and return the final value map.
    ///
    /// Steps run strictly in schema order, each seeing the cumulative
    /// effect of its predecessors. The first failure - unresolvable plugin
    /// or step, or a domain error from a step - aborts the run.
    pub fn run(mut self, registry: &LogicRegistry) -> PlanResult<ValueMap> {
        let logic = &self.schema.logic;
        let plugin = registry
            .get(logic)
            .ok_or_else(|| PlanError::logic_not_found(logic))?;

        debug!(
            module = %self.schema.module_id,
            logic = %logic,
            steps = self.schema.steps.len(),
            "pipeline start"
        );

        for step_name in &self.schema.steps {
            let step = plugin
                .step(step_name)
                .ok_or_else(|| PlanError::step_not_found(logic, step_name))?;
            trace!(module = %self.schema.module_id, step = %step_name, "executing step");
            self.values = step(std::mem::take(&mut self.values))
                .map_err(|e| wrap_step_error(&self.schema.module_id, step_name, e))?;
        }
        Ok(self.values)
    }
}

fn wrap_step_error(module: &str, step: &str, error: StepError) -> PlanError {
    match error {
        StepError::Domain { reason } => PlanError::computation(module, step, reason),
        StepError::MissingInput { field } => PlanError::missing_input(module, step, field),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::{LogicPlugin, StepFn, StepResult};
    use serde_json::json;

    fn schema(json: serde_json::Value) -> Arc<ModuleSchema> {
        Arc::new(ModuleSchema::from_value(json).unwrap())
    }

    fn overrides(entries: &[(&str, serde_json::Value)]) -> ValueMap {
        entries
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect()
    }

    #[test]
    fn test_seeding_defaults_then_overrides() {
        let schema = schema(json!({
            "moduleName": "Conveyor segment",
            "moduleId": "CONVEYOR",
            "parameters": {
                "length_m": { "datatype": "numeric", "defaultValue": 10.0 },
                "motor_power_kw": { "datatype": "numeric", "defaultValue": 5.5 },
                "origin": { "datatype": "text" }
            },
        }));

        let instance = ModuleInstance::with_overrides(
            schema,
            &overrides(&[("length_m", json!(25.0)), ("origin", json!("C1"))]),
        );

        assert_eq!(instance.values().get_f64("length_m"), Some(25.0));
        assert_eq!(instance.values().get_f64("motor_power_kw"), Some(5.5));
        assert_eq!(instance.values().get_str("origin"), Some("C1"));
    }

    #[test]
    fn test_empty_pipeline_returns_seeded_values_unchanged() {
        let schema = schema(json!({
            "moduleName": "Conveyor segment",
            "moduleId": "CONVEYOR",
            "parameters": {
                "length_m": { "datatype": "numeric", "defaultValue": 10.0 }
            },
        }));

        let instance = ModuleInstance::new(schema);
        let seeded = instance.values().clone();
        let result = instance.run(LogicRegistry::builtin()).unwrap();
        assert_eq!(result, seeded);
    }

    #[test]
    fn test_unknown_logic_is_fatal() {
        let schema = schema(json!({
            "moduleName": "Mystery",
            "moduleId": "MYSTERY",
        }));

        let err = ModuleInstance::new(schema)
            .run(LogicRegistry::builtin())
            .unwrap_err();
        assert_eq!(err, PlanError::logic_not_found("mystery"));
    }

    #[test]
    fn test_unknown_step_is_fatal() {
        let schema = schema(json!({
            "moduleName": "Conveyor segment",
            "moduleId": "CONVEYOR",
            "steps": ["no_such_step"],
        }));

        let err = ModuleInstance::new(schema)
            .run(LogicRegistry::builtin())
            .unwrap_err();
        assert_eq!(err, PlanError::step_not_found("conveyor", "no_such_step"));
    }

    #[test]
    fn test_steps_run_in_order_and_see_prior_effects() {
        struct CountingLogic;
        fn append_a(mut values: ValueMap) -> StepResult {
            values.insert("trace", json!("a"));
            Ok(values)
        }
        fn append_b(mut values: ValueMap) -> StepResult {
            let prior = values.get_str("trace").unwrap_or("").to_string();
            values.insert("trace", json!(format!("{prior}b")));
            Ok(values)
        }
        impl LogicPlugin for CountingLogic {
            fn name(&self) -> &'static str {
                "counting"
            }
            fn step(&self, name: &str) -> Option<StepFn> {
                match name {
                    "append_a" => Some(append_a),
                    "append_b" => Some(append_b),
                    _ => None,
                }
            }
        }

        let mut registry = LogicRegistry::new();
        registry.register(CountingLogic);

        let schema = schema(json!({
            "moduleName": "Counting",
            "moduleId": "COUNTING",
            "steps": ["append_a", "append_b"],
        }));

        let result = ModuleInstance::new(schema).run(&registry).unwrap();
        assert_eq!(result.get_str("trace"), Some("ab"));
    }

    #[test]
    fn test_apply_globals_fills_absent_only() {
        let schema = schema(json!({
            "moduleName": "Conveyor segment",
            "moduleId": "CONVEYOR",
            "parameters": {
                "supply_voltage": {
                    "datatype": "text",
                    "source": ["global"],
                    "reference": "supply_voltage"
                },
                "avg_cable_length_m": {
                    "datatype": "numeric",
                    "source": ["global"],
                    "reference": "avg_cable_length_m"
                },
                "local_only": { "datatype": "numeric", "source": ["user"] },
                "untethered": { "datatype": "numeric", "source": ["global"] }
            },
        }));

        let mut global = ValueMap::new();
        global.insert("supply_voltage", json!("400V"));
        global.insert("avg_cable_length_m", json!(15.0));
        global.insert("untethered", json!(1.0));

        // avg_cable_length_m overridden: propagation must not replace it
        let mut instance = ModuleInstance::with_overrides(
            schema,
            &overrides(&[("avg_cable_length_m", json!(99.0))]),
        );
        instance.apply_globals(&global);

        assert_eq!(instance.values().get_str("supply_voltage"), Some("400V"));
        assert_eq!(instance.values().get_f64("avg_cable_length_m"), Some(99.0));
        // Global tag without a reference is a no-op
        assert!(!instance.values().is_set("untethered"));
        assert!(!instance.values().is_set("local_only"));
    }

    #[test]
    fn test_apply_globals_missing_reference_key_is_noop() {
        let schema = schema(json!({
            "moduleName": "Conveyor segment",
            "moduleId": "CONVEYOR",
            "parameters": {
                "supply_voltage": {
                    "datatype": "text",
                    "source": ["global"],
                    "reference": "not_in_global_result"
                }
            },
        }));

        let mut instance = ModuleInstance::new(schema);
        instance.apply_globals(&ValueMap::new());
        assert!(!instance.values().is_set("supply_voltage"));
    }

    #[test]
    fn test_hard_limits_are_not_enforced() {
        // The engine stores limits as metadata only; a value far outside
        // the declared hard limits still runs through the pipeline.
        let schema = schema(json!({
            "moduleName": "Conveyor segment",
            "moduleId": "CONVEYOR",
            "parameters": {
                "length_m": {
                    "datatype": "numeric",
                    "defaultValue": 10.0,
                    "hardLimits": { "min": 1.0, "max": 200.0 }
                }
            },
        }));

        let instance =
            ModuleInstance::with_overrides(schema, &overrides(&[("length_m", json!(5000.0))]));
        let result = instance.run(LogicRegistry::builtin()).unwrap();
        assert_eq!(result.get_f64("length_m"), Some(5000.0));
    }
}
