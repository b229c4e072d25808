//! Identity types for entities and classes

use serde::{Deserialize, Serialize};
use slotmap::{Key, KeyData};
use std::fmt;

slotmap::new_key_type! {
    /// Generational handle to an entity slot
    ///
    /// The index names a storage slot and the generation distinguishes the
    /// successive occupants of that slot. A handle whose generation no longer
    /// matches the slot reads as absent, so holding one never keeps an entity
    /// alive and never aliases a newer entity.
    pub struct EntityId;
}

impl EntityId {
    /// Create a handle from its raw parts
    ///
    /// Generation `n` is the `n`th occupant of the slot, starting at zero.
    pub fn new(index: u32, generation: u32) -> Self {
        let version = generation.wrapping_mul(2) | 1;
        Self::from_bits(((version as u64) << 32) | index as u64)
    }

    /// Slot index
    pub fn index(&self) -> u32 {
        self.to_bits() as u32
    }

    /// Slot generation
    pub fn generation(&self) -> u32 {
        ((self.to_bits() >> 32) as u32) >> 1
    }

    /// Pack into a single integer (slot version in the high half)
    pub fn to_bits(&self) -> u64 {
        self.data().as_ffi()
    }

    /// Inverse of [`EntityId::to_bits`]
    pub fn from_bits(bits: u64) -> Self {
        KeyData::from_ffi(bits).into()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entity:{}v{}", self.index(), self.generation())
    }
}

/// Identifier for an entity class (e.g. `func_door`, `light_spot`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DefId(pub String);

impl DefId {
    /// Create a new class identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DefId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for DefId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for DefId {
    fn from(s: String) -> Self {
        Self(s)
    }
}
