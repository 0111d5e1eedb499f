//! # Logic Registry
//!
//! Read-only name -> plugin table. The engine resolves a schema's `logic`
//! field against a registry; [`LogicRegistry::builtin`] is the process-wide
//! table of built-in plugins, built once at startup. Tests and embedders
//! can construct their own registry with custom plugins instead.

use std::collections::BTreeMap;
use std::sync::Arc;

use once_cell::sync::Lazy;

use super::cabinet::CabinetLogic;
use super::conveyor::ConveyorLogic;
use super::global::GlobalLogic;
use super::splitter::SplitterLogic;
use super::LogicPlugin;

static BUILTIN: Lazy<LogicRegistry> = Lazy::new(|| {
    let mut registry = LogicRegistry::new();
    registry.register(GlobalLogic);
    registry.register(ConveyorLogic);
    registry.register(SplitterLogic);
    registry.register(CabinetLogic);
    registry
});

/// Name -> logic plugin lookup table
pub struct LogicRegistry {
    plugins: BTreeMap<&'static str, Arc<dyn LogicPlugin>>,
}

impl LogicRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        LogicRegistry {
            plugins: BTreeMap::new(),
        }
    }

    /// Register a plugin under its own name, replacing any previous one
    pub fn register<P: LogicPlugin + 'static>(&mut self, plugin: P) {
        self.plugins.insert(plugin.name(), Arc::new(plugin));
    }

    /// Resolve a plugin by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn LogicPlugin>> {
        self.plugins.get(name).cloned()
    }

    /// Registered plugin names, in order
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.plugins.keys().copied()
    }

    /// The process-wide registry of built-in plugins
    pub fn builtin() -> &'static LogicRegistry {
        &BUILTIN
    }
}

impl Default for LogicRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry_contents() {
        let registry = LogicRegistry::builtin();
        let names: Vec<_> = registry.names().collect();
        assert_eq!(names, vec!["cabinet", "conveyor", "global", "splitter"]);
        assert!(registry.get("conveyor").is_some());
        assert!(registry.get("escalator").is_none());
    }

    #[test]
    fn test_custom_registration_replaces() {
        struct FakeConveyor;
        impl LogicPlugin for FakeConveyor {
            fn name(&self) -> &'static str {
                "conveyor"
            }
            fn step(&self, _name: &str) -> Option<super::super::StepFn> {
                None
            }
        }

        let mut registry = LogicRegistry::new();
        registry.register(ConveyorLogic);
        registry.register(FakeConveyor);
        let plugin = registry.get("conveyor").unwrap();
        assert!(plugin.step("size_power_cable").is_none());
    }
}
