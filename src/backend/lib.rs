// src/backend/lib.rs

pub mod adapter;
pub mod api;
pub mod error;
pub mod metrics;
pub mod models;
pub mod services;
pub mod storage;
pub mod utils;

// Types referenced by the exported Candid interface.
use crate::api::{
    SearchExistingUsersRequest, SelectExistingUserRequest, SubmitFriendRequestRequest, UserIdInput,
};
use crate::error::AcquisitionError;
use crate::metrics::AcquisitionMetrics;
use crate::models::{
    AcquisitionMode, FormField, FriendRequestAck, InitArgs, Key, NewMemberEdit, RelationshipKind,
    SearchResultView, ServiceConfig,
};
use crate::services::modal_controller::ModalView;
use crate::services::session_service::KeyPressResult;
use ic_cdk::api::management_canister::http_request::{HttpResponse, TransformArgs};

fn apply_init_args(args: Option<InitArgs>) {
    match storage::config::init_config(args) {
        Ok(config) => crate::log_info!("Family tree backend ready, collaborator API at {}", config.api_base_url),
        Err(e) => crate::log_error!("Init arguments rejected, keeping stored configuration: {}", e),
    }
}

#[ic_cdk::init]
fn init(args: Option<InitArgs>) {
    apply_init_args(args);
}

#[ic_cdk::post_upgrade]
fn post_upgrade(args: Option<InitArgs>) {
    // Open modals live on the heap and do not survive the upgrade.
    apply_init_args(args);
}

// Export Candid interface
ic_cdk::export_candid!();
