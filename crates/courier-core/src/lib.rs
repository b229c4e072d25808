//! Courier Core - Deferred message dispatch between entities
//!
//! This crate provides the core types for entity input/output wiring:
//! - Dynamic payload values (`Value`) with a closed conversion table
//! - Generational entity handles and name/class resolution
//! - Output signals (`Signal`) made of text-defined `Binding`s
//! - A time-ordered `EventScheduler` with fan-out delivery, cancellation
//!   and save/restore
//! - A reference host (`Level`) wiring an entity store to a scheduler
//!
//! ## Driving the scheduler
//!
//! ```
//! use courier_core::{Level, Value, ValueKind};
//!
//! let mut level = Level::new();
//! let button = level.spawn("button", "func_button");
//! let door = level.spawn("door", "func_door");
//! level.on_input("func_door", "Open", ValueKind::Void, |ctx| {
//!     ctx.entity.set("open", true);
//!     true
//! });
//! level.entities_mut().get_mut(button).unwrap().add_output("OnPressed", "door,Open,,0.1");
//!
//! level.fire_output(button, "OnPressed", Value::Void, None, 0.0).unwrap();
//! while !level.scheduler().is_empty() {
//!     level.tick();
//! }
//! assert_eq!(level.entities().get(door).unwrap().get("open"), Some(&Value::Bool(true)));
//! ```

pub mod config;
mod entity;
mod error;
mod event;
mod identity;
pub mod level;
pub mod persist;
pub mod resolver;
pub mod scheduler;
pub mod signal;
pub mod time;
mod value;

pub use config::SchedulerConfig;
pub use entity::{Entity, EntityStore};
pub use error::{Error, Result};
pub use event::{CallerInfo, EventTarget, InputData, PendingEvent, PendingSummary};
pub use identity::{DefId, EntityId};
pub use level::{EntityWorld, InputContext, InputHandler, Level, LevelSave};
pub use persist::{SavedEvent, SchedulerSave, SignalSave};
pub use resolver::{names_match, EntityResolver};
pub use scheduler::{EventScheduler, World};
pub use signal::{Binding, FireCount, Signal, DEFAULT_INPUT};
pub use time::{Clock, Tick};
pub use value::{conversion_rule, Color32, ConversionRule, Value, ValueKind, ValueMap, ValueRecord, Vector3};
