// src/events/mod.rs

mod bus;
mod types;

pub use bus::EventBus;
pub use types::{DomainEvent, GenreAdded, TitleAdded};
