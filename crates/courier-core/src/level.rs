//! Reference host: entities, input handlers and one scheduler
//!
//! A [`Level`] ties the dispatch core to an [`EntityStore`]. Input handlers
//! are registered per class and input name; each declares the payload kind
//! it expects, and incoming values are converted to that kind before the
//! handler runs.
//!
//! Every entity also accepts a few built-in inputs:
//! - `Kill` - cancel the entity's queued events and remove it
//! - `AddOutput` - `"<output> target:input:parameter:delay:count"`
//! - `FireUser1` .. `FireUser4` - fire `OnUser1` .. `OnUser4`

use crate::error::{Error, Result};
use crate::event::{CallerInfo, EventTarget, InputData, PendingEvent};
use crate::persist::{self, SchedulerSave};
use crate::resolver::EntityResolver;
use crate::scheduler::World;
use crate::{DefId, Entity, EntityId, EntityStore, EventScheduler, SchedulerConfig, Value, ValueKind};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// What a handler sees while processing one input
pub struct InputContext<'a> {
    /// The receiving entity
    pub entity: &'a mut Entity,
    /// The input, with its value converted to the handler's declared kind
    pub input: &'a InputData,
    pub scheduler: &'a mut EventScheduler,
}

impl InputContext<'_> {
    /// Fire one of the receiving entity's outputs
    ///
    /// The activator is carried over from the input being handled.
    pub fn fire_output(&mut self, output: &str, value: Value, extra_delay: f64) -> usize {
        fire_entity_output(self.entity, self.scheduler, output, value, self.input.activator, extra_delay)
    }

    /// Identity of the receiving entity
    pub fn caller_info(&self) -> CallerInfo {
        self.entity.caller_info()
    }
}

/// Handler function for one input
pub type InputFn = Box<dyn Fn(&mut InputContext<'_>) -> bool>;

/// A registered input handler
pub struct InputHandler {
    /// Class this handler applies to; `None` for every class
    pub class: Option<DefId>,
    /// Input name, compared case-insensitively
    pub input: String,
    /// Kind the incoming value is converted to
    pub kind: ValueKind,
    pub handler: InputFn,
}

impl InputHandler {
    fn accepts(&self, class: &str, input: &str) -> bool {
        self.input.eq_ignore_ascii_case(input)
            && self.class.as_ref().map_or(true, |c| c.as_str() == class)
    }
}

fn handler_for<'a>(handlers: &'a [InputHandler], class: &str, input: &str) -> Option<&'a InputHandler> {
    // Class-specific handlers win over catch-all ones.
    handlers
        .iter()
        .find(|h| h.class.is_some() && h.accepts(class, input))
        .or_else(|| handlers.iter().find(|h| h.class.is_none() && h.accepts(class, input)))
}

fn fire_entity_output(
    entity: &mut Entity,
    scheduler: &mut EventScheduler,
    output: &str,
    value: Value,
    activator: Option<EntityId>,
    extra_delay: f64,
) -> usize {
    let caller = entity.caller_info();
    match entity.outputs.iter_mut().find(|(key, _)| key.eq_ignore_ascii_case(output)) {
        Some((_, signal)) => signal.fire(scheduler, value, activator, Some(&caller), extra_delay),
        None => 0,
    }
}

/// Entities plus their input handlers; the [`World`] a level's scheduler
/// delivers into
#[derive(Default)]
pub struct EntityWorld {
    pub entities: EntityStore,
    handlers: Vec<InputHandler>,
}

impl EntityWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler; handlers registered later for the same class
    /// and input take precedence
    pub fn on_input(&mut self, handler: InputHandler) {
        self.handlers.insert(0, handler);
    }

    fn builtin_input(
        &mut self,
        target: EntityId,
        data: &InputData,
        scheduler: &mut EventScheduler,
    ) -> Option<bool> {
        let input = data.input.as_str();

        if input.eq_ignore_ascii_case("Kill") {
            return Some(destroy_entity(&mut self.entities, scheduler, target));
        }

        if input.eq_ignore_ascii_case("AddOutput") {
            let entity = self.entities.get_mut(target)?;
            let text = data.value.to_string();
            return Some(match add_output(entity, &text) {
                Ok(()) => true,
                Err(err) => {
                    warn!("AddOutput on '{}': {}", entity.name, err);
                    false
                }
            });
        }

        let user = input
            .get(..8)
            .filter(|prefix| prefix.eq_ignore_ascii_case("FireUser"))
            .and_then(|_| input[8..].parse::<u8>().ok())
            .filter(|n| (1..=4).contains(n))?;
        let entity = self.entities.get_mut(target)?;
        let output = format!("OnUser{}", user);
        fire_entity_output(entity, scheduler, &output, data.value.clone(), data.activator, 0.0);
        Some(true)
    }
}

/// Parse an `AddOutput` argument onto `entity`
///
/// Fields after the output name use `:` between them since the argument
/// itself travels inside a comma-separated binding.
pub fn add_output(entity: &mut Entity, text: &str) -> Result<()> {
    let text = text.trim();
    let (output, definition) = text
        .split_once(char::is_whitespace)
        .ok_or_else(|| Error::InvalidOutput(text.to_string()))?;
    let definition = definition.trim().replace(':', ",");
    let binding = entity.add_output(output, &definition).to_string();
    debug!("{}: added output {} -> {}", entity.name, output, binding);
    Ok(())
}

fn destroy_entity(entities: &mut EntityStore, scheduler: &mut EventScheduler, id: EntityId) -> bool {
    let Some(entity) = entities.get(id) else {
        return false;
    };
    let cancelled = scheduler.cancel(&*entities, &entity.caller_info());
    if cancelled > 0 {
        debug!("{}: cancelled {} pending events", entity.name, cancelled);
    }
    entities.remove(id).is_some()
}

impl EntityResolver for EntityWorld {
    fn find_by_name(
        &self,
        pattern: &str,
        start: Option<EntityId>,
        activator: Option<EntityId>,
        caller: Option<EntityId>,
    ) -> Option<EntityId> {
        self.entities.find_by_name(pattern, start, activator, caller)
    }

    fn find_by_class(&self, pattern: &str, start: Option<EntityId>) -> Option<EntityId> {
        self.entities.find_by_class(pattern, start)
    }

    fn name_of(&self, id: EntityId) -> Option<&str> {
        self.entities.name_of(id)
    }

    fn class_of(&self, id: EntityId) -> Option<&str> {
        self.entities.class_of(id)
    }
}

impl World for EntityWorld {
    fn accept_input(
        &mut self,
        target: EntityId,
        data: &InputData,
        scheduler: &mut EventScheduler,
    ) -> bool {
        let Some(class) = self.entities.class_of(target).map(str::to_string) else {
            return false;
        };

        let Some(handler) = handler_for(&self.handlers, &class, &data.input) else {
            if let Some(handled) = self.builtin_input(target, data, scheduler) {
                return handled;
            }
            debug!(
                "{} ({}) does not accept input {}",
                self.entities.name_of(target).unwrap_or(""),
                class,
                data.input
            );
            return false;
        };

        let mut converted = data.clone();
        if !converted.value.convert(handler.kind, &self.entities) {
            warn!(
                "{} ({}) input {}: cannot convert {} to {}",
                self.entities.name_of(target).unwrap_or(""),
                class,
                data.input,
                data.value.kind(),
                handler.kind
            );
            return false;
        }

        let Some(entity) = self.entities.get_mut(target) else {
            return false;
        };
        let mut ctx = InputContext {
            entity,
            input: &converted,
            scheduler,
        };
        (handler.handler)(&mut ctx)
    }
}

/// Persisted level: entities (with their outputs) and pending events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelSave {
    pub entities: EntityStore,
    pub events: SchedulerSave,
}

impl LevelSave {
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        persist::encode(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        persist::decode(bytes)
    }
}

/// Entities, handlers and the scheduler that connects them
pub struct Level {
    world: EntityWorld,
    scheduler: EventScheduler,
}

impl Level {
    /// Create an empty level with the default configuration
    pub fn new() -> Self {
        Self::with_config(SchedulerConfig::default())
    }

    pub fn with_config(config: SchedulerConfig) -> Self {
        Self {
            world: EntityWorld::new(),
            scheduler: EventScheduler::with_config(config),
        }
    }

    pub fn entities(&self) -> &EntityStore {
        &self.world.entities
    }

    pub fn entities_mut(&mut self) -> &mut EntityStore {
        &mut self.world.entities
    }

    pub fn scheduler(&self) -> &EventScheduler {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut EventScheduler {
        &mut self.scheduler
    }

    /// Current simulation time
    pub fn now(&self) -> f64 {
        self.scheduler.now()
    }

    /// Create an entity
    pub fn spawn(&mut self, name: impl Into<String>, class: impl Into<DefId>) -> EntityId {
        self.world.entities.create(name, class).id
    }

    /// Register an input handler for one class
    pub fn on_input(
        &mut self,
        class: impl Into<DefId>,
        input: impl Into<String>,
        kind: ValueKind,
        handler: impl Fn(&mut InputContext<'_>) -> bool + 'static,
    ) {
        self.world.on_input(InputHandler {
            class: Some(class.into()),
            input: input.into(),
            kind,
            handler: Box::new(handler),
        });
    }

    /// Register an input handler for every class
    pub fn on_any_input(
        &mut self,
        input: impl Into<String>,
        kind: ValueKind,
        handler: impl Fn(&mut InputContext<'_>) -> bool + 'static,
    ) {
        self.world.on_input(InputHandler {
            class: None,
            input: input.into(),
            kind,
            handler: Box::new(handler),
        });
    }

    /// Fire a named output of `entity`
    ///
    /// An output with no bindings queues nothing. Returns the number of
    /// events queued.
    pub fn fire_output(
        &mut self,
        entity: EntityId,
        output: &str,
        value: Value,
        activator: Option<EntityId>,
        extra_delay: f64,
    ) -> Result<usize> {
        let target = self
            .world
            .entities
            .get_mut(entity)
            .ok_or_else(|| Error::EntityNotFound(entity.to_string()))?;
        Ok(fire_entity_output(target, &mut self.scheduler, output, value, activator, extra_delay))
    }

    /// Queue an input by target name, as a console command would
    pub fn post(
        &mut self,
        target: impl Into<EventTarget>,
        input: impl Into<String>,
        value: Value,
        delay: f64,
    ) -> f64 {
        self.scheduler
            .enqueue(PendingEvent::new(target, input).with_value(value), delay)
    }

    /// Deliver an input immediately, bypassing the queue
    pub fn send(&mut self, target: EntityId, input: &InputData) -> bool {
        self.world.accept_input(target, input, &mut self.scheduler)
    }

    /// Advance the clock one tick and deliver everything due
    pub fn tick(&mut self) -> usize {
        self.scheduler.advance();
        self.service()
    }

    /// Deliver everything due at the current time
    pub fn service(&mut self) -> usize {
        self.scheduler.service_events(&mut self.world)
    }

    /// Remove an entity along with every event it queued
    pub fn destroy(&mut self, id: EntityId) -> bool {
        destroy_entity(&mut self.world.entities, &mut self.scheduler, id)
    }

    /// Drop all entities and pending events; handlers stay registered
    pub fn clear(&mut self) {
        self.scheduler.init();
        self.world.entities.clear();
    }

    pub fn save(&self) -> LevelSave {
        LevelSave {
            entities: self.world.entities.clone(),
            events: self.scheduler.save(),
        }
    }

    /// Replace entities and pending events with saved state
    ///
    /// The clock keeps its current time; saved events fire at their saved
    /// offsets from it.
    pub fn restore(&mut self, save: LevelSave) {
        for entity in save.entities.iter() {
            for signal in entity.outputs.values() {
                for binding in signal.bindings() {
                    crate::signal::observe_stamp(binding.stamp());
                }
            }
        }
        self.world.entities = save.entities;
        self.scheduler.clear();
        self.scheduler.restore(save.events);
    }
}

impl Default for Level {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Vector3;

    fn door_level() -> (Level, EntityId, EntityId) {
        let mut level = Level::with_config(SchedulerConfig::with_tick_interval(0.1));
        let button = level.spawn("button", "func_button");
        let door = level.spawn("door", "func_door");
        level.on_input("func_door", "Open", ValueKind::Void, |ctx| {
            ctx.entity.set("open", true);
            ctx.fire_output("OnOpen", Value::Void, 0.0);
            true
        });
        level
            .entities_mut()
            .get_mut(button)
            .unwrap()
            .add_output("OnPressed", "door,Open");
        (level, button, door)
    }

    #[test]
    fn test_output_reaches_handler() {
        let (mut level, button, door) = door_level();
        assert_eq!(level.fire_output(button, "OnPressed", Value::Void, None, 0.0).unwrap(), 1);
        level.service();
        assert_eq!(level.entities().get(door).unwrap().get("open"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_fire_output_on_dead_entity() {
        let (mut level, button, _) = door_level();
        level.destroy(button);
        let result = level.fire_output(button, "OnPressed", Value::Void, None, 0.0);
        assert!(matches!(result, Err(Error::EntityNotFound(_))));
    }

    #[test]
    fn test_value_converted_to_handler_kind() {
        let mut level = Level::new();
        let mover = level.spawn("mover", "func_movelinear");
        level.on_input("func_movelinear", "SetPosition", ValueKind::Vector3, |ctx| {
            ctx.entity.set("position", ctx.input.value.clone());
            true
        });
        level.on_input("func_movelinear", "SetColor", ValueKind::Color32, |_| true);

        assert!(level.send(mover, &InputData::new("SetPosition").with_value("1 2 3")));
        assert_eq!(
            level.entities().get(mover).unwrap().get("position"),
            Some(&Value::Vector3(Vector3::new(1.0, 2.0, 3.0)))
        );
        assert!(!level.send(mover, &InputData::new("SetColor").with_value(2.5f32)));
        assert!(!level.send(mover, &InputData::new("Unknown")));
    }

    #[test]
    fn test_class_handler_beats_catch_all() {
        let mut level = Level::new();
        let relay = level.spawn("relay", "logic_relay");
        let other = level.spawn("other", "info_target");
        level.on_any_input("Ping", ValueKind::Passthrough, |ctx| {
            ctx.entity.set("who", "any");
            true
        });
        level.on_input("logic_relay", "Ping", ValueKind::Passthrough, |ctx| {
            ctx.entity.set("who", "relay");
            true
        });

        level.send(relay, &InputData::new("ping"));
        level.send(other, &InputData::new("PING"));
        assert_eq!(level.entities().get(relay).unwrap().get("who"), Some(&Value::from("relay")));
        assert_eq!(level.entities().get(other).unwrap().get("who"), Some(&Value::from("any")));
    }

    #[test]
    fn test_kill_cancels_pending() {
        let (mut level, button, door) = door_level();
        level.fire_output(button, "OnPressed", Value::Void, None, 5.0).unwrap();
        assert_eq!(level.scheduler().len(), 1);

        assert!(level.send(button, &InputData::new("Kill")));
        assert!(level.scheduler().is_empty());
        assert!(!level.entities().contains(button));
        assert!(level.entities().contains(door));
    }

    #[test]
    fn test_kill_after_rename_cancels() {
        let (mut level, button, door) = door_level();
        level.fire_output(button, "OnPressed", Value::Void, None, 5.0).unwrap();
        level.entities_mut().get_mut(button).unwrap().name = "button_renamed".into();

        level.post(button, "Kill", Value::Void, 0.0);
        level.service();
        assert!(!level.entities().contains(button));
        assert!(level.scheduler().is_empty());

        level.scheduler_mut().set_time(10.0);
        level.service();
        assert_eq!(level.entities().get(door).unwrap().get("open"), None);
    }

    #[test]
    fn test_clear_keeps_handlers() {
        let (mut level, button, door) = door_level();
        level.fire_output(button, "OnPressed", Value::Void, None, 1.0).unwrap();

        level.clear();
        assert!(level.entities().is_empty());
        assert!(level.scheduler().is_empty());

        let new_door = level.spawn("door", "func_door");
        assert!(level.entities().get(door).is_none());
        assert!(level.entities().get(button).is_none());
        level.post("door", "Open", Value::Void, 0.0);
        level.service();
        assert_eq!(level.entities().get(new_door).unwrap().get("open"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_add_output_and_fire_user() {
        let mut level = Level::new();
        let relay = level.spawn("relay", "logic_relay");
        let lamp = level.spawn("lamp", "light");
        level.on_input("light", "TurnOn", ValueKind::Void, |ctx| {
            ctx.entity.set("on", true);
            true
        });

        let added = InputData::new("AddOutput").with_value("OnUser1 lamp:TurnOn::0.5:1");
        assert!(level.send(relay, &added));
        assert!(!level.send(relay, &InputData::new("AddOutput").with_value("garbage")));

        assert!(level.send(relay, &InputData::new("FireUser1")));
        assert!(!level.send(relay, &InputData::new("FireUser9")));
        assert_eq!(level.scheduler().len(), 1);
        assert!(level.entities().get(relay).unwrap().output("OnUser1").unwrap().is_empty());

        level.scheduler_mut().set_time(0.5);
        level.service();
        assert_eq!(level.entities().get(lamp).unwrap().get("on"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_save_restore_level() {
        let (mut level, button, door) = door_level();
        level.scheduler_mut().set_time(4.0);
        level.fire_output(button, "OnPressed", Value::Void, None, 1.5).unwrap();

        let bytes = level.save().to_bytes().unwrap();

        let (mut restored, _, _) = door_level();
        restored.restore(LevelSave::from_bytes(&bytes).unwrap());
        assert_eq!(restored.scheduler().next_fire_time(), Some(1.5));

        restored.scheduler_mut().set_time(1.5);
        restored.service();
        assert_eq!(restored.entities().get(door).unwrap().get("open"), Some(&Value::Bool(true)));
    }
}
