//! # Global Logic Plugin
//!
//! Steps for the project-wide global module. Its result becomes the source
//! of truth for global propagation, so the single step here normalizes the
//! supply voltage into a numeric form downstream plugins can use directly.

use super::{require_voltage, LogicPlugin, StepFn, StepResult};
use crate::values::{Value, ValueMap};

/// Logic plugin for the global module
pub struct GlobalLogic;

impl LogicPlugin for GlobalLogic {
    fn name(&self) -> &'static str {
        "global"
    }

    fn step(&self, name: &str) -> Option<StepFn> {
        match name {
            "parse_supply_voltage" => Some(parse_supply_voltage),
            _ => None,
        }
    }
}

/// Normalize `supply_voltage` (e.g. `"400V"`) into numeric `supply_voltage_v`
fn parse_supply_voltage(mut values: ValueMap) -> StepResult {
    let voltage = require_voltage(&values, "supply_voltage")?;
    values.insert("supply_voltage_v", Value::from(voltage));
    Ok(values)
}
