// src/backend/storage/config.rs
use crate::error::AcquisitionError;
use crate::log_info;
use crate::models::service_config::{InitArgs, ServiceConfig};
use crate::storage::memory::{get_memory, Memory, SERVICE_CONFIG_MEM_ID};
use crate::storage::storable::Cbor;
use ic_stable_structures::StableCell;
use std::cell::RefCell;
use validator::Validate;

thread_local! {
    /// Stable cell for the service configuration, kept across upgrades.
    static SERVICE_CONFIG: RefCell<StableCell<Cbor<ServiceConfig>, Memory>> = RefCell::new(
        StableCell::init(get_memory(SERVICE_CONFIG_MEM_ID), Cbor(ServiceConfig::default()))
            .expect("Failed to initialize service config stable cell")
    );
}

/// Applies init/upgrade arguments over the stored configuration.
/// Called from `init` and `post_upgrade`; invalid arguments are rejected and the stored value kept.
pub fn init_config(args: Option<InitArgs>) -> Result<ServiceConfig, AcquisitionError> {
    let merged = match args {
        Some(args) => get_config().merged_with(args),
        None => get_config(),
    };
    set_config(merged)
}

/// Get the current service configuration.
pub fn get_config() -> ServiceConfig {
    SERVICE_CONFIG.with(|cell| cell.borrow().get().0.clone())
}

/// Validates and stores a new configuration.
pub fn set_config(config: ServiceConfig) -> Result<ServiceConfig, AcquisitionError> {
    config
        .validate()
        .map_err(|e| AcquisitionError::InvalidInput(e.to_string()))?;
    SERVICE_CONFIG.with(|cell| {
        cell.borrow_mut()
            .set(Cbor(config.clone()))
            .map_err(|e| AcquisitionError::SerializationError(format!("{:?}", e)))
    })?;
    log_info!(
        "Configuration updated: api_base_url={}, outcall_cycles={}, max_response_bytes={}",
        config.api_base_url,
        config.http_outcall_cycles,
        config.max_response_bytes
    );
    Ok(config)
}
