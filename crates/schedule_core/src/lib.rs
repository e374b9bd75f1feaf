pub mod chain;
pub mod config;
pub mod cursor;
pub mod error;
pub mod group;
pub mod occurrence;
pub mod render;
pub mod selection;
pub mod store;
pub mod tasks;
pub mod window;

pub use crate::cursor::{CursorSource, Direction, OccurrenceCursor, Query};
pub use crate::store::OccurrenceStore;
pub use crate::window::{WindowStatus, WindowedList};
