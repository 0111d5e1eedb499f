//! # Cabinet Logic Plugin
//!
//! Sizing steps for the deferred control-cabinet module. The orchestrator
//! injects the fan-in of all other modules before this pipeline runs:
//!
//! - `cabinet_elements` - reported switchgear grouped by originating module
//! - `motor_currents` - every reported motor rated current, in amperes
//! - `motor_rated_loads` / `motor_operating_loads` - reported loads, in kW

use super::{round2, LogicPlugin, StepFn, StepResult};
use crate::values::{Value, ValueMap};

/// Injection key: grouped cabinet elements
pub const KEY_CABINET_ELEMENTS: &str = "cabinet_elements";
/// Injection key: collected motor rated currents
pub const KEY_MOTOR_CURRENTS: &str = "motor_currents";
/// Injection key: collected motor rated loads
pub const KEY_MOTOR_RATED_LOADS: &str = "motor_rated_loads";
/// Injection key: collected motor operating loads
pub const KEY_MOTOR_OPERATING_LOADS: &str = "motor_operating_loads";

/// Standard main-switch frame sizes, in amperes
const MAIN_SWITCH_SIZES_A: [f64; 5] = [63.0, 125.0, 250.0, 400.0, 630.0];

/// Diversity factor applied to the summed rated currents
const DIVERSITY_FACTOR: f64 = 0.75;

/// Main-switch rating from which a separate supply field is required
const SUPPLY_FIELD_THRESHOLD_A: f64 = 400.0;

/// Logic plugin for the control cabinet
pub struct CabinetLogic;

impl LogicPlugin for CabinetLogic {
    fn name(&self) -> &'static str {
        "cabinet"
    }

    fn step(&self, name: &str) -> Option<StepFn> {
        match name {
            "size_main_switch" => Some(size_main_switch),
            "summarize_loads" => Some(summarize_loads),
            _ => None,
        }
    }
}

fn sum_numbers(values: &ValueMap, key: &str) -> f64 {
    values
        .get_array(key)
        .unwrap_or(&[])
        .iter()
        .filter_map(Value::as_f64)
        .sum()
}

/// Pick the main switch from the collected motor currents.
///
/// Demand is the summed rated currents times a 0.75 diversity factor; the
/// smallest standard frame covering it wins, falling back to the largest
/// frame when none does.
fn size_main_switch(mut values: ValueMap) -> StepResult {
    let total_current = sum_numbers(&values, KEY_MOTOR_CURRENTS);
    let required = total_current * DIVERSITY_FACTOR;
    let suggested = MAIN_SWITCH_SIZES_A
        .iter()
        .copied()
        .find(|&size| size >= required)
        .unwrap_or(MAIN_SWITCH_SIZES_A[MAIN_SWITCH_SIZES_A.len() - 1]);

    let reserve = (suggested - required) / suggested * 100.0;

    values.insert("total_motor_current_a", Value::from(round2(total_current)));
    values.insert("main_switch_size", Value::from(format!("{suggested}A")));
    values.insert(
        "needs_supply_field",
        Value::from(suggested >= SUPPLY_FIELD_THRESHOLD_A),
    );
    values.insert("capacity_reserve_percent", Value::from(round2(reserve)));
    Ok(values)
}

/// Sum the collected rated and operating loads and count the elements
/// landing in the cabinet.
fn summarize_loads(mut values: ValueMap) -> StepResult {
    let rated = sum_numbers(&values, KEY_MOTOR_RATED_LOADS);
    let operating = sum_numbers(&values, KEY_MOTOR_OPERATING_LOADS);
    let element_count: usize = values
        .get(KEY_CABINET_ELEMENTS)
        .and_then(Value::as_object)
        .map(|groups| {
            groups
                .values()
                .filter_map(Value::as_array)
                .map(Vec::len)
                .sum()
        })
        .unwrap_or(0);

    values.insert("total_motor_rated_load", Value::from(round2(rated)));
    values.insert("total_motor_operating_load", Value::from(round2(operating)));
    values.insert("cabinet_element_count", Value::from(element_count));
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_size_main_switch_picks_smallest_frame() {
        let mut values = ValueMap::new();
        values.insert(KEY_MOTOR_CURRENTS, json!([10.5, 22.3]));

        let result = size_main_switch(values).unwrap();
        // 32.8 A total, 24.6 A demand: 63 A frame
        assert_eq!(result.get_f64("total_motor_current_a"), Some(32.8));
        assert_eq!(result.get_str("main_switch_size"), Some("63A"));
        assert_eq!(result.get_bool("needs_supply_field"), Some(false));
        // (63 - 24.6) / 63 = 60.95%
        assert_eq!(result.get_f64("capacity_reserve_percent"), Some(60.95));
    }

    #[test]
    fn test_size_main_switch_large_plant_needs_supply_field() {
        let mut values = ValueMap::new();
        // 600 A demand after diversity: 630 A frame, supply field required
        values.insert(KEY_MOTOR_CURRENTS, json!([400.0, 400.0]));

        let result = size_main_switch(values).unwrap();
        assert_eq!(result.get_str("main_switch_size"), Some("630A"));
        assert_eq!(result.get_bool("needs_supply_field"), Some(true));
    }

    #[test]
    fn test_size_main_switch_caps_at_largest_frame() {
        let mut values = ValueMap::new();
        values.insert(KEY_MOTOR_CURRENTS, json!([900.0, 900.0]));

        let result = size_main_switch(values).unwrap();
        assert_eq!(result.get_str("main_switch_size"), Some("630A"));
        // Over capacity: reserve goes negative rather than lying
        assert!(result.get_f64("capacity_reserve_percent").unwrap() < 0.0);
    }

    #[test]
    fn test_size_main_switch_with_no_motors() {
        let result = size_main_switch(ValueMap::new()).unwrap();
        assert_eq!(result.get_str("main_switch_size"), Some("63A"));
        assert_eq!(result.get_f64("capacity_reserve_percent"), Some(100.0));
    }

    #[test]
    fn test_summarize_loads() {
        let mut values = ValueMap::new();
        values.insert(KEY_MOTOR_RATED_LOADS, json!([5.5, 2.2, 2.2]));
        values.insert(KEY_MOTOR_OPERATING_LOADS, json!([4.4, 1.76, 1.76]));
        values.insert(
            KEY_CABINET_ELEMENTS,
            json!({
                "C1": [{ "component": "contactor" }, { "component": "motor_protection_switch" }],
                "S1": [{ "component": "frequency_inverter" }],
            }),
        );

        let result = summarize_loads(values).unwrap();
        assert_eq!(result.get_f64("total_motor_rated_load"), Some(9.9));
        assert_eq!(result.get_f64("total_motor_operating_load"), Some(7.92));
        assert_eq!(result.get_f64("cabinet_element_count"), Some(3.0));
    }
}
