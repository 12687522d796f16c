// src/backend/utils/mod.rs

pub mod guards;
pub mod log;
