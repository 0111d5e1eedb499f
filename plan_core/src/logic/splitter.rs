//! # Splitter Logic Plugin
//!
//! Sizing step for a line splitter driving several identical motors. Each
//! drive gets its own cable sizing record in the reported `drives` list so
//! the orchestrator can pick up every rated current for cabinet fan-in.

use serde_json::json;

use super::electrical::{motor_rated_current, size_conductor, DEFAULT_SAFETY_FACTOR};
use super::{f64_or, require_f64, require_voltage, round2, LogicPlugin, StepFn, StepResult};
use crate::values::{Value, ValueMap, KEY_CONTROL_CABINET, KEY_DRIVES, KEY_ORIGIN};

const DEFAULT_LOAD_FACTOR: f64 = 0.8;

/// Logic plugin for line splitters
pub struct SplitterLogic;

impl LogicPlugin for SplitterLogic {
    fn name(&self) -> &'static str {
        "splitter"
    }

    fn step(&self, name: &str) -> Option<StepFn> {
        match name {
            "size_drives" => Some(size_drives),
            _ => None,
        }
    }
}

/// Size cable and current for every drive of the splitter.
///
/// Splitter drives are always inverter-fed, so the cabinet gets a line
/// protection and a frequency inverter regardless of drive count.
fn size_drives(mut values: ValueMap) -> StepResult {
    let voltage = require_voltage(&values, "supply_voltage")?;
    let length = require_f64(&values, "length_m")?;
    let power = require_f64(&values, "motor_power_kw")?;
    let max_drop = require_f64(&values, "max_voltage_drop_percent")?;
    let avg_cable_length = f64_or(&values, "avg_cable_length_m", 0.0);
    let safety_factor = f64_or(&values, "safety_factor", DEFAULT_SAFETY_FACTOR);
    let load_factor = f64_or(&values, "load_factor", DEFAULT_LOAD_FACTOR);
    let drive_count = f64_or(&values, "drive_count", 1.0).max(1.0) as usize;

    let cable_length = length + avg_cable_length;
    let current = motor_rated_current(power, voltage, safety_factor)?;
    let (cross_section, drop) = size_conductor(current, cable_length, voltage, max_drop)?;

    // Identical drives, identical records
    let drive = json!({
        "power_cable_length_m": cable_length,
        "motor_rated_current": round2(current),
        "conductor_cross_section_mm2": cross_section,
        "voltage_drop_percent": round2(drop),
    });
    values.insert(KEY_DRIVES, Value::Array(vec![drive; drive_count]));

    let origin = values.get_str("origin").map(str::to_string);
    let elements: Vec<Value> = ["line_protection", "frequency_inverter"]
        .iter()
        .map(|component| match &origin {
            Some(origin) => json!({ "component": component, KEY_ORIGIN: origin }),
            None => json!({ "component": component }),
        })
        .collect();
    values.insert(KEY_CONTROL_CABINET, Value::Array(elements));

    values.insert("conduit_length_m", Value::from(length));
    let total_power = power * drive_count as f64;
    values.insert("motor_rated_load", Value::from(round2(total_power)));
    values.insert(
        "motor_operating_load",
        Value::from(round2(total_power * load_factor)),
    );
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn splitter_inputs() -> ValueMap {
        let mut values = ValueMap::new();
        values.insert("supply_voltage", json!(400.0));
        values.insert("length_m", json!(8.0));
        values.insert("avg_cable_length_m", json!(12.0));
        values.insert("motor_power_kw", json!(2.2));
        values.insert("max_voltage_drop_percent", json!(3.0));
        values.insert("safety_factor", json!(1.0));
        values.insert("drive_count", json!(3));
        values
    }

    #[test]
    fn test_size_drives_emits_one_record_per_drive() {
        let result = size_drives(splitter_inputs()).unwrap();

        let drives = result.get_array(KEY_DRIVES).unwrap();
        assert_eq!(drives.len(), 3);
        assert_eq!(drives[0], drives[2]);
        assert_eq!(drives[0]["power_cable_length_m"], json!(20.0));

        let currents = result.drive_currents();
        assert_eq!(currents.len(), 3);
        assert!(currents.iter().all(|&c| c == currents[0]));

        // 3 × 2.2 kW at 80% load factor
        assert_eq!(result.motor_rated_load(), Some(6.6));
        assert_eq!(result.motor_operating_load(), Some(5.28));
        // No scalar motor_rated_current: currents live on the drives
        assert_eq!(result.motor_rated_current(), None);
    }

    #[test]
    fn test_size_drives_cabinet_elements() {
        let mut values = splitter_inputs();
        values.insert("origin", json!("S1"));
        let result = size_drives(values).unwrap();

        let elements = result.cabinet_elements();
        assert_eq!(elements.len(), 2);
        assert_eq!(elements[0]["component"], "line_protection");
        assert_eq!(elements[1]["component"], "frequency_inverter");
        assert_eq!(elements[0]["origin"], "S1");
    }

    #[test]
    fn test_size_drives_defaults_to_single_drive() {
        let mut values = splitter_inputs();
        values.remove("drive_count");
        let result = size_drives(values).unwrap();
        assert_eq!(result.get_array(KEY_DRIVES).unwrap().len(), 1);
    }
}
