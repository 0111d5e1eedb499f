//! # Conveyor Logic Plugin
//!
//! Sizing steps for one conveyor segment: estimate the drive motor's rated
//! current, pick a power-cable cross-section against the voltage-drop
//! budget, and report the control-cabinet elements the segment needs.
//!
//! ## Inputs
//!
//! | name | unit | notes |
//! |------|------|-------|
//! | `supply_voltage` | V | number or `"400V"` string, usually propagated |
//! | `length_m` | m | segment length |
//! | `avg_cable_length_m` | m | average run from segment to cabinet |
//! | `motor_power_kw` | kW | rated mechanical power (0.75-45) |
//! | `max_voltage_drop_percent` | % | sizing budget |
//! | `safety_factor` | - | optional current headroom |
//! | `load_factor` | - | optional, operating vs. rated load |
//! | `start_method` | - | `"DOL"` or `"VFD"` |
//! | `origin` | - | optional tag put on reported cabinet elements |

use serde_json::json;

use super::electrical::{motor_rated_current, size_conductor, DEFAULT_SAFETY_FACTOR};
use super::{f64_or, require_f64, require_voltage, round2, LogicPlugin, StepFn, StepResult};
use crate::values::{Value, ValueMap, KEY_CONTROL_CABINET, KEY_ORIGIN};

/// Default ratio of operating load to rated load
const DEFAULT_LOAD_FACTOR: f64 = 0.8;

/// Logic plugin for conveyor segments
pub struct ConveyorLogic;

impl LogicPlugin for ConveyorLogic {
    fn name(&self) -> &'static str {
        "conveyor"
    }

    fn step(&self, name: &str) -> Option<StepFn> {
        match name {
            "size_power_cable" => Some(size_power_cable),
            "select_cabinet_elements" => Some(select_cabinet_elements),
            _ => None,
        }
    }
}

/// Estimate the motor current and size the power cable.
///
/// Cable length is the segment length plus the average run to the cabinet;
/// the conduit only spans the segment itself.
fn size_power_cable(mut values: ValueMap) -> StepResult {
    let voltage = require_voltage(&values, "supply_voltage")?;
    let length = require_f64(&values, "length_m")?;
    let power = require_f64(&values, "motor_power_kw")?;
    let max_drop = require_f64(&values, "max_voltage_drop_percent")?;
    let avg_cable_length = f64_or(&values, "avg_cable_length_m", 0.0);
    let safety_factor = f64_or(&values, "safety_factor", DEFAULT_SAFETY_FACTOR);
    let load_factor = f64_or(&values, "load_factor", DEFAULT_LOAD_FACTOR);

    let cable_length = length + avg_cable_length;
    let current = motor_rated_current(power, voltage, safety_factor)?;
    let (cross_section, drop) = size_conductor(current, cable_length, voltage, max_drop)?;

    values.insert("power_cable_length_m", Value::from(cable_length));
    values.insert("motor_rated_current", Value::from(round2(current)));
    values.insert("conductor_cross_section_mm2", Value::from(cross_section));
    values.insert("voltage_drop_percent", Value::from(round2(drop)));
    values.insert("conduit_length_m", Value::from(length));
    values.insert("motor_rated_load", Value::from(power));
    values.insert("motor_operating_load", Value::from(round2(power * load_factor)));
    Ok(values)
}

/// Report the switchgear this segment contributes to the control cabinet.
///
/// Direct-on-line starters need a motor protection switch and a contactor;
/// anything else is assumed inverter-fed.
fn select_cabinet_elements(mut values: ValueMap) -> StepResult {
    let components: &[&str] = if values.get_str("start_method") == Some("DOL") {
        &["motor_protection_switch", "contactor"]
    } else {
        &["line_protection", "frequency_inverter"]
    };

    let origin = values.get_str("origin").map(str::to_string);
    let elements: Vec<Value> = components
        .iter()
        .map(|component| match &origin {
            Some(origin) => json!({ "component": component, KEY_ORIGIN: origin }),
            None => json!({ "component": component }),
        })
        .collect();

    values.insert(KEY_CONTROL_CABINET, Value::Array(elements));
    Ok(values)
}
