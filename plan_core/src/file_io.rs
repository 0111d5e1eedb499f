//! # File I/O Module
//!
//! Thin wrappers around the filesystem: loading module schemas from JSON
//! files and saving project results with an atomic write (write to `.tmp`,
//! then rename) so a crash never leaves a half-written result behind.

use std::fs;
use std::path::Path;

use crate::errors::{PlanError, PlanResult};
use crate::project::ProjectResult;
use crate::schema::ModuleSchema;

/// Load one module schema from a JSON file
pub fn load_schema(path: &Path) -> PlanResult<ModuleSchema> {
    let text = fs::read_to_string(path)
        .map_err(|e| PlanError::file_error("read", path.display().to_string(), e.to_string()))?;
    ModuleSchema::from_json_str(&text)
}

/// Load every `*.json` module schema in a directory, sorted by file name.
///
/// Sorting keeps the load order (and thus any project built from it)
/// deterministic across platforms.
pub fn load_schema_dir(dir: &Path) -> PlanResult<Vec<ModuleSchema>> {
    let entries = fs::read_dir(dir)
        .map_err(|e| PlanError::file_error("read_dir", dir.display().to_string(), e.to_string()))?;

    let mut paths: Vec<_> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    paths.iter().map(|path| load_schema(path)).collect()
}

/// Save a project result as pretty JSON with an atomic write
pub fn save_result(result: &ProjectResult, path: &Path) -> PlanResult<()> {
    let json = serde_json::to_string_pretty(result)
        .map_err(|e| PlanError::file_error("serialize", path.display().to_string(), e.to_string()))?;

    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, &json).map_err(|e| {
        PlanError::file_error("write", tmp_path.display().to_string(), e.to_string())
    })?;
    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        PlanError::file_error("rename", path.display().to_string(), e.to_string())
    })?;
    Ok(())
}

/// Load a previously saved project result
pub fn load_result(path: &Path) -> PlanResult<ProjectResult> {
    let text = fs::read_to_string(path)
        .map_err(|e| PlanError::file_error("read", path.display().to_string(), e.to_string()))?;
    serde_json::from_str(&text)
        .map_err(|e| PlanError::file_error("parse", path.display().to_string(), e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::LogicRegistry;
    use crate::project::Project;
    use serde_json::json;
    use std::env::temp_dir;
    use std::path::PathBuf;
    use std::sync::Arc;

    fn temp_path(name: &str) -> PathBuf {
        temp_dir().join(format!("planwerk_test_{}", name))
    }

    fn global_schema_json() -> String {
        json!({
            "moduleName": "Project globals",
            "moduleId": "GLOBAL",
            "parameters": {
                "supply_voltage": { "datatype": "text", "defaultValue": "400V" }
            },
            "steps": ["parse_supply_voltage"],
        })
        .to_string()
    }

    #[test]
    fn test_load_schema() {
        let path = temp_path("load_schema.json");
        fs::write(&path, global_schema_json()).unwrap();

        let schema = load_schema(&path).unwrap();
        assert_eq!(schema.module_id, "GLOBAL");
        assert_eq!(schema.logic, "global");

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_load_schema_missing_file() {
        let err = load_schema(Path::new("/no/such/schema.json")).unwrap_err();
        assert_eq!(err.error_code(), "FILE_ERROR");
    }

    #[test]
    fn test_load_schema_dir_sorted() {
        let dir = temp_path("schema_dir");
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("20_conveyor.json"),
            json!({ "moduleName": "Conveyor segment", "moduleId": "CONVEYOR" }).to_string(),
        )
        .unwrap();
        fs::write(dir.join("10_global.json"), global_schema_json()).unwrap();
        fs::write(dir.join("notes.txt"), "ignored").unwrap();

        let schemas = load_schema_dir(&dir).unwrap();
        let ids: Vec<_> = schemas.iter().map(|s| s.module_id.as_str()).collect();
        assert_eq!(ids, vec!["GLOBAL", "CONVEYOR"]);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_save_and_load_result_roundtrip() {
        let path = temp_path("result_roundtrip.json");
        let schema = Arc::new(ModuleSchema::from_json_str(&global_schema_json()).unwrap());
        let project = Project::new("Test Engineer", "TEST-001", "Test Client", schema);
        let result = project.run(LogicRegistry::builtin()).unwrap();

        save_result(&result, &path).unwrap();
        let loaded = load_result(&path).unwrap();
        assert_eq!(loaded, result);

        let _ = fs::remove_file(&path);
    }
}
