//! # Pipeline Value Model
//!
//! Every module instance carries its state as a [`ValueMap`]: an ordered
//! mapping from parameter name to a JSON value. Steps take the map, return a
//! replacement, and the engine threads it through the pipeline.
//!
//! A handful of keys are *reserved*: when they show up in a module's result
//! the orchestrator reads them for cross-module aggregation into the control
//! cabinet. Everything else is opaque to the engine and passes through
//! untouched, so logic plugins are free to stash whatever private fields
//! they need.
//!
//! ## Example
//!
//! ```rust
//! use plan_core::values::ValueMap;
//! use serde_json::json;
//!
//! let mut values = ValueMap::new();
//! values.insert("motor_power_kw", json!(5.5));
//! values.insert("motor_rated_current", json!(10.52));
//!
//! assert_eq!(values.get_f64("motor_power_kw"), Some(5.5));
//! assert_eq!(values.motor_rated_current(), Some(10.52));
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Values are plain JSON: numbers, strings, booleans, lists, objects.
pub type Value = serde_json::Value;

// ============================================================================
// Reserved Aggregation Keys
// ============================================================================

/// List of control-cabinet elements, each optionally tagged with an origin
pub const KEY_CONTROL_CABINET: &str = "control_cabinet";
/// Rated current of a single motor, in amperes
pub const KEY_MOTOR_RATED_CURRENT: &str = "motor_rated_current";
/// List of drive records, each carrying its own `motor_rated_current`
pub const KEY_DRIVES: &str = "drives";
/// Rated (connected) load of a module's motor, in kW
pub const KEY_MOTOR_RATED_LOAD: &str = "motor_rated_load";
/// Expected operating load of a module's motor, in kW
pub const KEY_MOTOR_OPERATING_LOAD: &str = "motor_operating_load";
/// Tag on a cabinet element naming the module that reported it
pub const KEY_ORIGIN: &str = "origin";

// ============================================================================
// ValueMap
// ============================================================================

/// Ordered name -> value mapping threaded through a module's step pipeline.
///
/// Backed by a `BTreeMap` so iteration order (and thus serialization and
/// aggregation) is deterministic across runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValueMap(BTreeMap<String, Value>);

impl ValueMap {
    /// Create an empty value map
    pub fn new() -> Self {
        ValueMap(BTreeMap::new())
    }

    /// Look up a value by name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Insert a value, returning the previous one if any
    pub fn insert(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(name.into(), value)
    }

    /// Remove a value by name
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.0.remove(name)
    }

    /// True if a *usable* value is present: the key exists and is not null.
    ///
    /// Global propagation only fills parameters for which this is false, so
    /// a null default behaves the same as no default at all.
    pub fn is_set(&self, name: &str) -> bool {
        matches!(self.0.get(name), Some(v) if !v.is_null())
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if the map has no entries
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over entries in name order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    // ------------------------------------------------------------------
    // Typed convenience accessors
    // ------------------------------------------------------------------

    /// Get a value as f64 (integers coerce)
    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_f64)
    }

    /// Get a value as &str
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    /// Get a value as bool
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    /// Get a value as a list slice
    pub fn get_array(&self, name: &str) -> Option<&[Value]> {
        self.get(name).and_then(Value::as_array).map(Vec::as_slice)
    }

    // ------------------------------------------------------------------
    // Reserved-key readers (used by the orchestrator's collect phase)
    // ------------------------------------------------------------------

    /// The module's reported motor rated current, if any
    pub fn motor_rated_current(&self) -> Option<f64> {
        self.get_f64(KEY_MOTOR_RATED_CURRENT)
    }

    /// The module's reported motor rated load, if any
    pub fn motor_rated_load(&self) -> Option<f64> {
        self.get_f64(KEY_MOTOR_RATED_LOAD)
    }

    /// The module's reported motor operating load, if any
    pub fn motor_operating_load(&self) -> Option<f64> {
        self.get_f64(KEY_MOTOR_OPERATING_LOAD)
    }

    /// Reported control-cabinet elements (empty when the key is absent)
    pub fn cabinet_elements(&self) -> &[Value] {
        self.get_array(KEY_CONTROL_CABINET).unwrap_or(&[])
    }

    /// Rated currents of all entries in a reported `drives` list
    pub fn drive_currents(&self) -> Vec<f64> {
        self.get_array(KEY_DRIVES)
            .unwrap_or(&[])
            .iter()
            .filter_map(|drive| drive.get(KEY_MOTOR_RATED_CURRENT).and_then(Value::as_f64))
            .collect()
    }
}

impl FromIterator<(String, Value)> for ValueMap {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        ValueMap(iter.into_iter().collect())
    }
}
