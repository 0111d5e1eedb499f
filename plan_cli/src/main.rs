//! # Planwerk CLI Application
//!
//! Runs a demo conveyor-line project end to end: a global module, two
//! conveyor segments, a line splitter and the deferred control cabinet.
//! Prints a human summary plus the full JSON result for API/LLM use.

use std::process::ExitCode;
use std::sync::Arc;

use plan_core::logic::LogicRegistry;
use plan_core::project::{Project, ProjectResult};
use plan_core::schema::ModuleSchema;
use plan_core::values::ValueMap;
use plan_core::PlanResult;
use serde_json::json;

fn global_schema() -> PlanResult<Arc<ModuleSchema>> {
    Ok(Arc::new(ModuleSchema::from_value(json!({
        "moduleName": "Project globals",
        "moduleId": "GLOBAL",
        "parameters": {
            "supply_voltage": { "datatype": "text", "defaultValue": "400V" },
            "avg_cable_length_m": { "datatype": "numeric", "defaultValue": 15.0 },
            "max_voltage_drop_percent": { "datatype": "numeric", "defaultValue": 3.0 },
            "safety_factor": { "datatype": "numeric", "defaultValue": 1.05 }
        },
        "steps": ["parse_supply_voltage"],
    }))?))
}

fn conveyor_schema() -> PlanResult<Arc<ModuleSchema>> {
    Ok(Arc::new(ModuleSchema::from_value(json!({
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
            "max_voltage_drop_percent": {
                "datatype": "numeric",
                "source": ["global"],
                "reference": "max_voltage_drop_percent"
            },
            "safety_factor": {
                "datatype": "numeric",
                "source": ["global"],
                "reference": "safety_factor"
            },
            "length_m": {
                "datatype": "numeric",
                "defaultValue": 10.0,
                "hardLimits": { "min": 1.0, "max": 200.0 },
                "source": ["user"]
            },
            "motor_power_kw": {
                "datatype": "numeric",
                "defaultValue": 5.5,
                "hardLimits": { "min": 0.75, "max": 45.0 },
                "source": ["user"]
            },
            "load_factor": { "datatype": "numeric", "defaultValue": 0.8 },
            "start_method": {
                "datatype": "enum",
                "defaultValue": "DOL",
                "options": ["DOL", "VFD"]
            },
            "origin": { "datatype": "text", "editableInFrontend": false }
        },
        "steps": ["size_power_cable", "select_cabinet_elements"],
    }))?))
}

fn splitter_schema() -> PlanResult<Arc<ModuleSchema>> {
    Ok(Arc::new(ModuleSchema::from_value(json!({
        "moduleName": "Line splitter",
        "moduleId": "SPLITTER",
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
            "max_voltage_drop_percent": {
                "datatype": "numeric",
                "source": ["global"],
                "reference": "max_voltage_drop_percent"
            },
            "length_m": { "datatype": "numeric", "defaultValue": 8.0, "source": ["user"] },
            "motor_power_kw": { "datatype": "numeric", "defaultValue": 2.2, "source": ["user"] },
            "drive_count": { "datatype": "numeric", "defaultValue": 2, "source": ["user"] },
            "origin": { "datatype": "text", "editableInFrontend": false }
        },
        "steps": ["size_drives"],
    }))?))
}

fn cabinet_schema() -> PlanResult<Arc<ModuleSchema>> {
    Ok(Arc::new(ModuleSchema::from_value(json!({
        "moduleName": "Main control cabinet",
        "moduleId": "CABINET",
        "logic": "cabinet",
        "steps": ["size_main_switch", "summarize_loads"],
    }))?))
}

fn override_map(entries: &[(&str, serde_json::Value)]) -> ValueMap {
    entries
        .iter()
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect()
}

fn build_demo_project() -> PlanResult<Project> {
    let mut project = Project::new(
        "Demo Engineer",
        "25-117",
        "Acme Intralogistics",
        global_schema()?,
    );

    let conveyor = conveyor_schema()?;
    project.add_module(
        Arc::clone(&conveyor),
        Some(&override_map(&[
            ("origin", json!("C1")),
            ("length_m", json!(24.0)),
            ("motor_power_kw", json!(7.5)),
        ])),
    )?;
    project.add_module(
        conveyor,
        Some(&override_map(&[
            ("origin", json!("C2")),
            ("length_m", json!(36.0)),
            ("start_method", json!("VFD")),
        ])),
    )?;
    project.add_module(
        splitter_schema()?,
        Some(&override_map(&[("origin", json!("S1"))])),
    )?;
    project.add_module(cabinet_schema()?, None)?;
    Ok(project)
}

fn print_summary(result: &ProjectResult) {
    println!("═══════════════════════════════════════");
    println!("  PROJECT RESULT - {}", result.meta.job_id);
    println!("═══════════════════════════════════════");
    println!();
    for module in &result.modules {
        println!("{} ({})", module.module_name, module.module_id);
        if let Some(current) = module.values.motor_rated_current() {
            println!("  Motor rated current: {:.2} A", current);
        }
        if let Some(cross_section) = module.values.get_f64("conductor_cross_section_mm2") {
            println!("  Power cable:         {} mm²", cross_section);
        }
        if let Some(size) = module.values.get_str("main_switch_size") {
            println!("  Main switch:         {}", size);
        }
        if let Some(reserve) = module.values.get_f64("capacity_reserve_percent") {
            println!("  Capacity reserve:    {:.2} %", reserve);
        }
        println!();
    }
}

fn run() -> PlanResult<ProjectResult> {
    let project = build_demo_project()?;
    project.run(LogicRegistry::builtin())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("Planwerk CLI - Conveyor Line Electrical Planner");
    println!("===============================================");
    println!();

    match run() {
        Ok(result) => {
            print_summary(&result);
            println!("JSON Output (for LLM/API use):");
            if let Ok(json) = serde_json::to_string_pretty(&result) {
                println!("{}", json);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            if let Ok(json) = serde_json::to_string_pretty(&e) {
                eprintln!();
                eprintln!("Error JSON:");
                eprintln!("{}", json);
            }
            ExitCode::FAILURE
        }
    }
}
