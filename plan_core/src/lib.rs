//! # plan_core - Conveyor Line Electrical Planning Engine
//!
//! `plan_core` composes independent engineering-calculation modules
//! (conveyor segments, line splitters, a control cabinet) into a single
//! project result. Modules are described by declarative JSON schemas; each
//! schema names a logic plugin and an ordered step pipeline, and the
//! project orchestrator runs everything as one deterministic pass.
//!
//! ## Design Philosophy
//!
//! - **Schemas are blueprints**: immutable, shared, validated at
//!   construction
//! - **JSON-First**: all values, results and errors serialize cleanly
//! - **Fail fast**: a run yields a complete project result or a structured
//!   error naming the module and step - never partial output
//! - **Static dispatch**: logic plugins live in a read-only registry built
//!   at startup; unknown names are typed errors, not panics
//!
//! ## Quick Start
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
//!
//! // Serialize for storage or transmission
//! let json = serde_json::to_string_pretty(&result).unwrap();
//! ```
//!
//! ## Modules
//!
//! - [`schema`] - module/parameter blueprints
//! - [`values`] - the pipeline value model and reserved aggregation keys
//! - [`instance`] - runtime binding of a schema to values, step execution
//! - [`project`] - project orchestration, global propagation, cabinet fan-in
//! - [`logic`] - logic plugin contract, registry, and built-in plugins
//! - [`errors`] - structured error types
//! - [`file_io`] - schema loading and atomic result saves

pub mod errors;
pub mod file_io;
pub mod instance;
pub mod logic;
pub mod project;
pub mod schema;
pub mod values;

// Re-export commonly used types at crate root for convenience
pub use errors::{PlanError, PlanResult};
pub use instance::ModuleInstance;
pub use logic::{LogicPlugin, LogicRegistry};
pub use project::{Project, ProjectResult};
pub use schema::{ModuleSchema, ParameterSchema};
pub use values::{Value, ValueMap};
