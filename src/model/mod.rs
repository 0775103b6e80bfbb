// File: ./src/model/mod.rs
// Aggregates the split model files
pub mod item;
pub mod parser;
pub mod slot;

pub use item::{DEFAULT_COLOR, Event, EventDraft, Recurrence};
pub use parser::parse_time;
pub use slot::Slot;
