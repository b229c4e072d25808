//! RON level loader

use crate::error::{Error, Result};
use crate::schema::{EntityDef, LevelDef};
use courier_core::{EntityId, Level, SchedulerConfig, Value};
use log::{debug, info};
use std::fs;
use std::path::Path;

/// Loaded level definitions
#[derive(Debug, Default)]
pub struct LevelDefs {
    /// Tick interval requested by the loaded files, if any
    pub tick_interval: Option<f64>,
    /// Entity definitions in load order
    pub entities: Vec<EntityDef>,
}

impl LevelDefs {
    /// Create empty level definitions
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the first entity definition with the given name
    pub fn get_entity(&self, name: &str) -> Option<&EntityDef> {
        self.entities.iter().find(|e| e.name.eq_ignore_ascii_case(name))
    }

    /// `base` with the loaded tick interval applied
    pub fn config(&self, base: SchedulerConfig) -> SchedulerConfig {
        let mut config = base;
        if let Some(interval) = self.tick_interval {
            config.set_tick_interval(interval);
        }
        config
    }

    /// Spawn every defined entity into `level`
    ///
    /// Properties are stored as string values and each binding string is
    /// parsed onto its output. Returns the new handles in definition order.
    pub fn spawn_into(&self, level: &mut Level) -> Vec<EntityId> {
        let mut spawned = Vec::with_capacity(self.entities.len());
        for def in &self.entities {
            let id = level.spawn(def.name.clone(), def.class.clone());
            if let Some(entity) = level.entities_mut().get_mut(id) {
                for (key, value) in &def.properties {
                    entity.set(key.clone(), Value::String(value.clone()));
                }
                for (output, bindings) in &def.outputs {
                    for text in bindings {
                        entity.add_output(output, text);
                    }
                }
            }
            spawned.push(id);
        }
        info!("spawned {} entities", spawned.len());
        spawned
    }

    /// Build a fresh level holding every defined entity
    pub fn build_level(&self, base: SchedulerConfig) -> Level {
        let mut level = Level::with_config(self.config(base));
        self.spawn_into(&mut level);
        level
    }
}

/// Loader for RON level files
pub struct LevelLoader {
    defs: LevelDefs,
}

impl LevelLoader {
    /// Create a new loader
    pub fn new() -> Self {
        Self {
            defs: LevelDefs::new(),
        }
    }

    /// Load a single RON file
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        debug!("loading level file {:?}", path);
        self.load_str(&content)
    }

    /// Load a level definition from a RON string
    ///
    /// Entities are appended after those already loaded. A file may only set
    /// the tick interval if no earlier file set a different one.
    pub fn load_str(&mut self, content: &str) -> Result<()> {
        let file: LevelDef = ron::from_str(content)?;

        for (index, entity) in file.entities.iter().enumerate() {
            if entity.class.as_str().trim().is_empty() {
                return Err(Error::MissingField(format!("entities[{}].class", index)));
            }
            if let Some((output, _)) = entity.outputs.iter().find(|(name, _)| name.trim().is_empty()) {
                return Err(Error::InvalidSchema(format!(
                    "entity '{}' has an unnamed output '{}'",
                    entity.name, output
                )));
            }
        }

        if let Some(interval) = file.tick_interval {
            if !interval.is_finite() || interval <= 0.0 {
                return Err(Error::InvalidSchema(format!("tick_interval {} is not positive", interval)));
            }
            match self.defs.tick_interval {
                Some(existing) if existing != interval => {
                    return Err(Error::ConflictingDefinition(format!(
                        "tick_interval {} vs {}",
                        existing, interval
                    )));
                }
                _ => self.defs.tick_interval = Some(interval),
            }
        }

        self.defs.entities.extend(file.entities);
        Ok(())
    }

    /// Load all RON files from a directory
    ///
    /// Files are loaded in path order; subdirectories are loaded recursively.
    pub fn load_directory(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if !path.is_dir() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Not a directory: {:?}", path),
            )));
        }

        let mut entries = fs::read_dir(path)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<Vec<_>>>()?;
        entries.sort();

        for file_path in entries {
            if file_path.extension().map(|e| e == "ron").unwrap_or(false) {
                self.load_file(&file_path)?;
            } else if file_path.is_dir() {
                self.load_directory(&file_path)?;
            }
        }

        Ok(())
    }

    /// Finish loading and return the level definitions
    pub fn finish(self) -> LevelDefs {
        self.defs
    }

    /// Get the current definitions (for inspection during loading)
    pub fn defs(&self) -> &LevelDefs {
        &self.defs
    }
}

impl Default for LevelLoader {
    fn default() -> Self {
        Self::new()
    }
}
