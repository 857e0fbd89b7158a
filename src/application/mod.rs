// src/application/mod.rs

mod state;

pub use state::AppState;
