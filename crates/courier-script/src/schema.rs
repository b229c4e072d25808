//! Schema definitions for RON level files

use courier_core::DefId;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Contents of one level file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LevelDef {
    /// Scheduler tick interval in seconds
    #[serde(default)]
    pub tick_interval: Option<f64>,
    /// Entities to spawn, in file order
    #[serde(default)]
    pub entities: Vec<EntityDef>,
}

/// Definition of a single entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityDef {
    /// Targetname; empty or repeated names are allowed
    #[serde(default)]
    pub name: String,
    /// Entity class (e.g. `func_door`)
    pub class: DefId,
    /// Initial properties, stored as string values
    #[serde(default)]
    pub properties: IndexMap<String, String>,
    /// Binding text per output name
    #[serde(default)]
    pub outputs: IndexMap<String, Vec<String>>,
}

impl EntityDef {
    /// Create an entity definition with no properties or outputs
    pub fn new(name: impl Into<String>, class: impl Into<DefId>) -> Self {
        Self {
            name: name.into(),
            class: class.into(),
            properties: IndexMap::new(),
            outputs: IndexMap::new(),
        }
    }

    /// Add a binding to an output
    pub fn with_output(mut self, output: impl Into<String>, binding: impl Into<String>) -> Self {
        self.outputs.entry(output.into()).or_default().push(binding.into());
        self
    }

    /// Set a property
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Number of bindings across all outputs
    pub fn binding_count(&self) -> usize {
        self.outputs.values().map(Vec::len).sum()
    }
}
