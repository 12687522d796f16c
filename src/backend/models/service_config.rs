// src/backend/models/service_config.rs
use candid::{CandidType, Principal};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

pub const DEFAULT_API_BASE_URL: &str = "https://family.example.com";
pub const DEFAULT_HTTP_OUTCALL_CYCLES: u128 = 100_000_000;
pub const DEFAULT_MAX_RESPONSE_BYTES: u64 = 64 * 1024;
pub const DEFAULT_MIN_CYCLES_THRESHOLD: u128 = 10_000_000_000; // 10B cycles

/// Runtime settings for the collaborator adapter and the canister guards.
#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq, Validate)]
pub struct ServiceConfig {
    #[validate(custom(function = "validate_api_base_url"))]
    pub api_base_url: String,
    pub http_outcall_cycles: u128,
    #[validate(range(min = 1024, max = 2_000_000))] // IC outcall responses are capped at 2MB
    pub max_response_bytes: u64,
    pub min_cycles_threshold: u128,
    pub admin: Option<Principal>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            http_outcall_cycles: DEFAULT_HTTP_OUTCALL_CYCLES,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
            min_cycles_threshold: DEFAULT_MIN_CYCLES_THRESHOLD,
            admin: None,
        }
    }
}

/// Arguments accepted by `init` and `post_upgrade`.
#[derive(CandidType, Deserialize, Clone, Debug, Default)]
pub struct InitArgs {
    pub api_base_url: Option<String>,
    pub http_outcall_cycles: Option<u128>,
    pub max_response_bytes: Option<u64>,
    pub min_cycles_threshold: Option<u128>,
    pub admin: Option<Principal>,
}

impl ServiceConfig {
    /// Overlays the provided init arguments on top of `self`.
    pub fn merged_with(mut self, args: InitArgs) -> Self {
        if let Some(url) = args.api_base_url {
            self.api_base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(cycles) = args.http_outcall_cycles {
            self.http_outcall_cycles = cycles;
        }
        if let Some(bytes) = args.max_response_bytes {
            self.max_response_bytes = bytes;
        }
        if let Some(threshold) = args.min_cycles_threshold {
            self.min_cycles_threshold = threshold;
        }
        if args.admin.is_some() {
            self.admin = args.admin;
        }
        self
    }
}

// HTTP outcalls only support https targets.
fn validate_api_base_url(url: &str) -> Result<(), ValidationError> {
    if !url.starts_with("https://") {
        return Err(ValidationError::new("api_base_url_not_https"));
    }
    if url.ends_with('/') {
        return Err(ValidationError::new("api_base_url_trailing_slash"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(ServiceConfig::default().validate().is_ok());
    }

    #[test]
    fn init_args_override_defaults() {
        let config = ServiceConfig::default().merged_with(InitArgs {
            api_base_url: Some("https://tree.example.org/".to_string()),
            max_response_bytes: Some(4096),
            ..Default::default()
        });
        assert_eq!(config.api_base_url, "https://tree.example.org");
        assert_eq!(config.max_response_bytes, 4096);
        assert_eq!(config.http_outcall_cycles, DEFAULT_HTTP_OUTCALL_CYCLES);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn plain_http_is_rejected() {
        let config = ServiceConfig {
            api_base_url: "http://tree.example.org".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
