// src/infrastructure/mod.rs

mod media_store;

pub use media_store::MediaStore;
