// src/backend/storage/mod.rs

pub mod config;
pub mod memory;
pub mod sessions;
pub mod storable;

pub use memory::Memory;
pub use storable::Cbor;
