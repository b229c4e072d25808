//! Message types queued by the scheduler

use crate::{DefId, EntityId, Value};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Who a pending event is addressed to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventTarget {
    /// Resolve by name (falling back to class) at dispatch time
    Named(String),
    /// A specific entity, resolved when the event was queued
    Direct(EntityId),
}

impl EventTarget {
    /// The target entity, if addressed directly
    pub fn as_direct(&self) -> Option<EntityId> {
        match self {
            EventTarget::Direct(id) => Some(*id),
            EventTarget::Named(_) => None,
        }
    }
}

impl fmt::Display for EventTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventTarget::Named(name) => f.write_str(name),
            EventTarget::Direct(id) => write!(f, "{}", id),
        }
    }
}

impl From<&str> for EventTarget {
    fn from(name: &str) -> Self {
        EventTarget::Named(name.to_string())
    }
}

impl From<String> for EventTarget {
    fn from(name: String) -> Self {
        EventTarget::Named(name)
    }
}

impl From<EntityId> for EventTarget {
    fn from(id: EntityId) -> Self {
        EventTarget::Direct(id)
    }
}

/// Identity of the entity that fired an output
///
/// The name and class are captured when the event is queued so that
/// cancellation can tell an entity apart from a later occupant of the same
/// handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerInfo {
    pub id: EntityId,
    pub name: String,
    pub class: DefId,
}

impl CallerInfo {
    pub fn new(id: EntityId, name: impl Into<String>, class: impl Into<DefId>) -> Self {
        Self {
            id,
            name: name.into(),
            class: class.into(),
        }
    }

    /// Same handle, same name, same class
    pub fn is_same(&self, other: &CallerInfo) -> bool {
        self.id == other.id && self.name == other.name && self.class == other.class
    }
}

/// A scheduled, not yet delivered message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingEvent {
    /// Absolute simulation time the event becomes due
    pub fire_time: f64,
    pub target: EventTarget,
    pub input: String,
    pub value: Value,
    pub activator: Option<EntityId>,
    pub caller: Option<CallerInfo>,
    /// Stamp of the binding that produced this event, 0 if none
    pub stamp: u64,
}

impl PendingEvent {
    /// Create an event; the fire time is assigned when it is queued
    pub fn new(target: impl Into<EventTarget>, input: impl Into<String>) -> Self {
        Self {
            fire_time: 0.0,
            target: target.into(),
            input: input.into(),
            value: Value::Void,
            activator: None,
            caller: None,
            stamp: 0,
        }
    }

    /// Set the payload
    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = value.into();
        self
    }

    /// Set the activator
    pub fn with_activator(mut self, activator: Option<EntityId>) -> Self {
        self.activator = activator;
        self
    }

    /// Set the caller
    pub fn with_caller(mut self, caller: Option<CallerInfo>) -> Self {
        self.caller = caller;
        self
    }

    /// Set the originating binding stamp
    pub fn with_stamp(mut self, stamp: u64) -> Self {
        self.stamp = stamp;
        self
    }

    pub fn caller_id(&self) -> Option<EntityId> {
        self.caller.as_ref().map(|c| c.id)
    }

    /// Input arguments handed to each recipient
    pub fn input_data(&self) -> InputData {
        InputData {
            input: self.input.clone(),
            activator: self.activator,
            caller: self.caller_id(),
            value: self.value.clone(),
            stamp: self.stamp,
        }
    }
}

/// Arguments of one input delivery
#[derive(Debug, Clone, PartialEq)]
pub struct InputData {
    pub input: String,
    pub activator: Option<EntityId>,
    pub caller: Option<EntityId>,
    pub value: Value,
    pub stamp: u64,
}

impl InputData {
    /// Input with no payload, activator or caller
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            activator: None,
            caller: None,
            value: Value::Void,
            stamp: 0,
        }
    }

    /// Set the payload
    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = value.into();
        self
    }
}

/// One line of a scheduler dump
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSummary {
    /// Seconds until the event fires
    pub time_to_fire: f64,
    pub target: String,
    pub input: String,
    pub parameter: String,
}

impl fmt::Display for PendingSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({:.2}) target: '{}', input: '{}', parameter: '{}'",
            self.time_to_fire, self.target, self.input, self.parameter
        )
    }
}
