//! # Electrical Sizing Arithmetic
//!
//! Shared three-phase sizing formulas used by the conveyor and splitter
//! plugins: motor rated-current estimation, conductor selection against a
//! voltage-drop budget, and the drop check itself.
//!
//! ## Assumptions
//!
//! - 4-pole squirrel-cage motor, 50 Hz, IE2/IE3 efficiency class
//! - Power factor (cos φ) and efficiency (η) combined into one factor that
//!   scales with rated power, fitted by logarithmic regression against
//!   typical manufacturer data (0.75-45 kW) and clamped to 0.62...0.87
//! - Copper conductors, line-to-line voltage, symmetric load

use serde_json::Value;

use super::StepError;

/// Copper resistivity in ohm·mm²/m
pub const COPPER_RESISTIVITY: f64 = 0.018;

/// Standard copper cross-sections considered for power cables, in mm²
pub const STANDARD_CROSS_SECTIONS_MM2: [f64; 9] =
    [1.5, 2.5, 4.0, 6.0, 10.0, 16.0, 25.0, 35.0, 50.0];

/// Supported motor power range for the current regression, in kW
pub const MOTOR_POWER_RANGE_KW: (f64, f64) = (0.75, 45.0);

/// Current headroom applied when a module supplies no `safety_factor`
pub const DEFAULT_SAFETY_FACTOR: f64 = 1.01;

/// Estimate the rated current of a three-phase motor.
///
/// `I = safety_factor · P / (√3 · U · η·cosφ)` with the combined
/// `η·cosφ ≈ 0.6557 + 0.0560 · ln(P[kW])`, clamped to a conservative range.
/// A `safety_factor` above 1.0 adds headroom to the estimate.
///
/// Fails for powers outside the regression's supported range.
pub fn motor_rated_current(
    power_kw: f64,
    voltage_v: f64,
    safety_factor: f64,
) -> Result<f64, StepError> {
    let (min_kw, max_kw) = MOTOR_POWER_RANGE_KW;
    if !(min_kw..=max_kw).contains(&power_kw) {
        return Err(StepError::domain(format!(
            "motor power {power_kw} kW outside supported range ({min_kw}-{max_kw} kW)"
        )));
    }
    let eff_cosphi = (0.655_721_9 + 0.056_040_7 * power_kw.ln()).clamp(0.62, 0.87);
    Ok(safety_factor * power_kw * 1000.0 / (3.0_f64.sqrt() * voltage_v * eff_cosphi))
}

/// Select the smallest standard cross-section keeping the voltage drop
/// within `max_drop_percent`.
///
/// Returns `(cross_section_mm2, drop_percent)`, or a domain error when even
/// the largest standard size cannot meet the budget.
pub fn size_conductor(
    current_a: f64,
    length_m: f64,
    voltage_v: f64,
    max_drop_percent: f64,
) -> Result<(f64, f64), StepError> {
    for cross_section in STANDARD_CROSS_SECTIONS_MM2 {
        let drop = drop_percent(current_a, length_m, voltage_v, cross_section);
        if drop <= max_drop_percent {
            return Ok((cross_section, drop));
        }
    }
    Err(StepError::domain(format!(
        "voltage-drop budget of {max_drop_percent}% over {length_m} m exceeds available cable sizes"
    )))
}

/// Voltage drop in percent for a given standard cross-section.
///
/// Fails when `cross_section_mm2` is not one of the standard sizes.
pub fn voltage_drop_percent(
    current_a: f64,
    length_m: f64,
    voltage_v: f64,
    cross_section_mm2: f64,
) -> Result<f64, StepError> {
    if !STANDARD_CROSS_SECTIONS_MM2.contains(&cross_section_mm2) {
        return Err(StepError::domain(format!(
            "cross-section {cross_section_mm2} mm² is not a standard size"
        )));
    }
    Ok(drop_percent(current_a, length_m, voltage_v, cross_section_mm2))
}

fn drop_percent(current_a: f64, length_m: f64, voltage_v: f64, cross_section_mm2: f64) -> f64 {
    // Out-and-back conductor resistance
    let resistance = 2.0 * length_m * COPPER_RESISTIVITY / cross_section_mm2;
    let delta_u = 3.0_f64.sqrt() * current_a * resistance;
    delta_u / voltage_v * 100.0
}

/// Parse a supply-voltage value: a plain number, or the conventional string
/// form with a trailing unit (`"400V"`).
pub fn parse_voltage(value: &Value) -> Option<f64> {
    match value {
        Value::Number(_) => value.as_f64(),
        Value::String(text) => text
            .trim()
            .trim_end_matches(['V', 'v'])
            .trim()
            .parse()
            .ok(),
        _ => None,
    }
}
