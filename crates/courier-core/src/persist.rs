//! Save/restore records
//!
//! Pending events are stored with their fire time converted to a delay
//! relative to the clock at save time, because the clock restarts when a
//! save is loaded. Signals store their bindings followed by the last value
//! they carried, the value as a kind tag plus raw payload record.

use crate::error::Result;
use crate::event::{CallerInfo, EventTarget};
use crate::signal::Binding;
use crate::{EntityId, Value};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A pending event as persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedEvent {
    /// Seconds after the save point the event was due
    pub delay: f64,
    pub target: EventTarget,
    pub input: String,
    pub value: Value,
    pub activator: Option<EntityId>,
    pub caller: Option<CallerInfo>,
    pub stamp: u64,
}

/// Every pending event of a scheduler, in firing order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchedulerSave {
    pub events: Vec<SavedEvent>,
}

impl SchedulerSave {
    /// Number of saved events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        encode(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        decode(bytes)
    }
}

/// The persisted state of one signal
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalSave {
    pub default_target: Option<String>,
    pub bindings: Vec<Binding>,
    pub last_value: Value,
}

impl SignalSave {
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        encode(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        decode(bytes)
    }
}

/// Encode any save record with bincode
pub fn encode<T: Serialize>(record: &T) -> Result<Vec<u8>> {
    Ok(bincode::serialize(record)?)
}

/// Decode a save record written by [`encode`]
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    Ok(bincode::deserialize(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_scheduler_save_bytes() {
        let save = SchedulerSave {
            events: vec![SavedEvent {
                delay: 1.25,
                target: EventTarget::Named("door".into()),
                input: "Open".into(),
                value: Value::from("fast"),
                activator: None,
                caller: Some(CallerInfo::new(EntityId::new(1, 0), "button", "func_button")),
                stamp: 4,
            }],
        };
        let bytes = save.to_bytes().unwrap();
        assert_eq!(SchedulerSave::from_bytes(&bytes).unwrap(), save);
    }

    #[test]
    fn test_truncated_save_is_an_error() {
        let bytes = SchedulerSave::default().to_bytes().unwrap();
        let result = SchedulerSave::from_bytes(&bytes[..bytes.len() - 1]);
        assert!(matches!(result, Err(Error::SaveData(_))));
    }
}
