//! Entity types for simulation objects

use crate::event::CallerInfo;
use crate::resolver::{names_match, procedural_target, EntityResolver};
use crate::signal::{Binding, Signal};
use crate::{DefId, EntityId, Value, ValueMap};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

/// A named simulation object with properties and outputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Handle of this entity
    pub id: EntityId,
    /// Targetname; may be empty or shared with other entities
    pub name: String,
    /// Class of this entity (e.g. `func_door`)
    pub class: DefId,
    /// Dynamic properties (e.g., {"speed": 100.0, "locked": false})
    pub properties: ValueMap,
    /// Output signals by name (e.g. `OnOpen`)
    pub outputs: IndexMap<String, Signal>,
}

impl Entity {
    /// Create a new entity
    pub fn new(id: EntityId, name: impl Into<String>, class: impl Into<DefId>) -> Self {
        Self {
            id,
            name: name.into(),
            class: class.into(),
            properties: ValueMap::new(),
            outputs: IndexMap::new(),
        }
    }

    /// Get a property value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// Set a property value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.properties.insert(key.into(), value.into());
    }

    /// Remove a property
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.properties.shift_remove(key)
    }

    /// Look up an output by name (case-insensitive)
    pub fn output(&self, name: &str) -> Option<&Signal> {
        self.outputs
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, signal)| signal)
    }

    /// Get or create an output
    pub fn output_mut(&mut self, name: &str) -> &mut Signal {
        let index = match self.outputs.keys().position(|key| key.eq_ignore_ascii_case(name)) {
            Some(index) => index,
            None => self.outputs.insert_full(name.to_string(), Signal::new()).0,
        };
        &mut self.outputs[index]
    }

    /// Parse binding text onto an output
    pub fn add_output(&mut self, output: &str, definition: &str) -> &Binding {
        self.output_mut(output).parse_binding(definition)
    }

    /// Identity snapshot used when this entity fires outputs
    pub fn caller_info(&self) -> CallerInfo {
        CallerInfo::new(self.id, self.name.clone(), self.class.clone())
    }
}

/// Storage for all entities of a level
///
/// Slots are reused after removal with a bumped generation, so stale
/// [`EntityId`]s never resolve to the new occupant.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityStore {
    entities: SlotMap<EntityId, Entity>,
}

impl EntityStore {
    /// Create a new empty entity store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new entity and add it to the store
    pub fn create(&mut self, name: impl Into<String>, class: impl Into<DefId>) -> &mut Entity {
        let (name, class) = (name.into(), class.into());
        let id = self.entities.insert_with_key(|id| Entity::new(id, name, class));
        &mut self.entities[id]
    }

    /// Get an entity by ID
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    /// Get a mutable reference to an entity
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(id)
    }

    /// Remove an entity, invalidating every handle to it
    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        self.entities.remove(id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(id)
    }

    /// First entity whose name is exactly `name` (case-insensitive)
    pub fn find(&self, name: &str) -> Option<&Entity> {
        self.iter().find(|e| !name.is_empty() && e.name.eq_ignore_ascii_case(name))
    }

    /// Get all entities of a given class
    pub fn by_class<'a>(&'a self, class: &'a DefId) -> impl Iterator<Item = &'a Entity> + 'a {
        self.iter().filter(move |e| &e.class == class)
    }

    /// Get all entity IDs
    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.keys()
    }

    /// Get all entities in slot order
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    /// Get all entities mutably
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.values_mut()
    }

    /// Get the number of entities
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Remove every entity; outstanding handles stay invalid
    pub fn clear(&mut self) {
        self.entities.clear();
    }

    /// Live entities in slot order after `start`
    fn scan_after(&self, start: Option<EntityId>) -> impl Iterator<Item = &Entity> {
        let from = start.map(|id| id.index());
        self.entities
            .iter()
            .filter(move |(id, _)| from.map_or(true, |from| id.index() > from))
            .map(|(_, entity)| entity)
    }
}

impl EntityResolver for EntityStore {
    fn find_by_name(
        &self,
        pattern: &str,
        start: Option<EntityId>,
        activator: Option<EntityId>,
        caller: Option<EntityId>,
    ) -> Option<EntityId> {
        if let Some(found) = procedural_target(pattern, start, activator, caller) {
            return found.filter(|id| self.contains(*id));
        }
        self.scan_after(start)
            .find(|e| names_match(pattern, &e.name))
            .map(|e| e.id)
    }

    fn find_by_class(&self, pattern: &str, start: Option<EntityId>) -> Option<EntityId> {
        self.scan_after(start)
            .find(|e| names_match(pattern, e.class.as_str()))
            .map(|e| e.id)
    }

    fn name_of(&self, id: EntityId) -> Option<&str> {
        self.get(id).map(|e| e.name.as_str())
    }

    fn class_of(&self, id: EntityId) -> Option<&str> {
        self.get(id).map(|e| e.class.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::find_all_by_name;

    #[test]
    fn test_entity() {
        let mut entity = Entity::new(EntityId::new(1, 0), "door_a", "func_door");
        entity.set("speed", 100.0f32);
        entity.add_output("OnOpen", "light,TurnOn");
        entity.add_output("onopen", "alarm,Trigger,,1");

        assert_eq!(entity.get("speed").and_then(|v| v.as_float()), Some(100.0));
        assert_eq!(entity.outputs.len(), 1);
        assert_eq!(entity.output("ONOPEN").map(|s| s.len()), Some(2));
        assert!(entity.output("OnClose").is_none());
    }

    #[test]
    fn test_entity_store() {
        let mut store = EntityStore::new();
        let a = store.create("door_a", "func_door").id;
        let b = store.create("door_b", "func_door").id;
        store.create("lamp", "light");

        assert_eq!(store.len(), 3);
        assert_eq!(store.by_class(&DefId::new("func_door")).count(), 2);
        assert_eq!(store.find("DOOR_B").map(|e| e.id), Some(b));
        assert!(store.get(a).is_some());
    }

    #[test]
    fn test_slot_reuse_bumps_generation() {
        let mut store = EntityStore::new();
        let old = store.create("x", "logic_relay").id;
        assert!(store.remove(old).is_some());
        assert!(store.remove(old).is_none());

        let new = store.create("y", "func_door").id;
        assert_eq!(new.index(), old.index());
        assert_ne!(new, old);
        assert!(store.get(old).is_none());
        assert_eq!(store.name_of(new), Some("y"));
        assert!(!store.is_alive(old));
    }

    #[test]
    fn test_find_by_name_iterates() {
        let mut store = EntityStore::new();
        let l1 = store.create("light_1", "light").id;
        store.create("switch", "func_button");
        let l2 = store.create("light_2", "light").id;

        assert_eq!(store.find_by_name("light_*", None, None, None), Some(l1));
        assert_eq!(store.find_by_name("light_*", Some(l1), None, None), Some(l2));
        assert_eq!(store.find_by_name("light_*", Some(l2), None, None), None);
        assert_eq!(find_all_by_name(&store, "light_*", None, None), vec![l1, l2]);
    }

    #[test]
    fn test_procedural_names() {
        let mut store = EntityStore::new();
        let button = store.create("button", "func_button").id;
        let player = store.create("", "player").id;

        assert_eq!(store.find_by_name("!activator", None, Some(player), Some(button)), Some(player));
        assert_eq!(store.find_by_name("!self", None, Some(player), Some(button)), Some(button));
        assert_eq!(find_all_by_name(&store, "!caller", None, Some(button)), vec![button]);

        store.remove(player);
        assert_eq!(store.find_by_name("!activator", None, Some(player), None), None);
    }

    #[test]
    fn test_find_by_class() {
        let mut store = EntityStore::new();
        let a = store.create("a", "light_spot").id;
        let b = store.create("b", "light").id;
        assert_eq!(store.find_by_class("light", None), Some(b));
        assert_eq!(store.find_by_class("light*", None), Some(a));
    }

    #[test]
    fn test_iter_mut() {
        let mut store = EntityStore::new();
        store.create("a", "light");
        store.create("b", "light");
        for entity in store.iter_mut() {
            entity.set("lit", true);
        }
        assert!(store.iter().all(|e| e.get("lit") == Some(&Value::Bool(true))));
    }

    #[test]
    fn test_stale_handle_after_save() {
        let mut store = EntityStore::new();
        let old = store.create("x", "logic_relay").id;
        store.remove(old);

        let bytes = bincode::serialize(&store).unwrap();
        let mut restored: EntityStore = bincode::deserialize(&bytes).unwrap();
        let new = restored.create("y", "logic_relay").id;
        assert_eq!(new.index(), old.index());
        assert!(restored.get(old).is_none());
    }

    #[test]
    fn test_clear() {
        let mut store = EntityStore::new();
        let a = store.create("a", "light").id;
        store.clear();
        assert!(store.is_empty());
        assert!(store.get(a).is_none());

        let b = store.create("b", "light").id;
        assert_ne!(a, b);
        assert!(store.get(a).is_none());
    }
}
