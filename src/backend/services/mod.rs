// src/backend/services/mod.rs

pub mod friend_request_service;
pub mod modal_controller;
pub mod mode_machine;
pub mod search_service;
pub mod session_service;
