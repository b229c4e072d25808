//! Courier Script - RON level definitions
//!
//! Loads level content from RON files:
//! - Entities with their names, classes and string properties
//! - Output bindings in `target,input,parameter,delay,count` form
//! - An optional tick interval override for the scheduler

mod error;
mod loader;
mod schema;

pub use error::{Error, Result};
pub use loader::{LevelDefs, LevelLoader};
pub use schema::{EntityDef, LevelDef};
