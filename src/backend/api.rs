// src/backend/api.rs
// Candid endpoints for the relative acquisition modal.

use crate::{
    adapter::{family_api_adapter::strip_response_headers, FamilyApiClient},
    error::AcquisitionError,
    metrics::{self, AcquisitionMetrics},
    models::{
        normalize_user_id as normalize, AcquisitionMode, FormField, FriendRequestAck, Key,
        NewMemberEdit, OwnerId, RelationshipKind, SearchResultView, ServiceConfig,
    },
    services::{
        modal_controller::ModalView,
        session_service::{self, KeyPressResult},
    },
    storage::config,
    utils::guards::{check_admin, check_cycles},
};
use candid::{CandidType, Deserialize, Principal};
use ic_cdk::api::management_canister::http_request::{HttpResponse, TransformArgs};
use ic_cdk::caller;
use ic_cdk_macros::{query, update};
use validator::Validate;

// --- Validation Helper ---
fn validate_request<T: Validate>(req: &T) -> Result<(), AcquisitionError> {
    req.validate()
        .map_err(|e| AcquisitionError::InvalidInput(e.to_string()))
}

/// Modals are keyed by caller, so anonymous callers would all share one.
fn authenticated_caller() -> Result<OwnerId, AcquisitionError> {
    let caller = caller();
    if caller == Principal::anonymous() {
        return Err(AcquisitionError::NotAuthorized(
            "Anonymous callers cannot open an acquisition modal.".to_string(),
        ));
    }
    Ok(caller)
}

fn family_api() -> FamilyApiClient {
    FamilyApiClient::new(&config::get_config())
}

// --- Request Structs ---

#[derive(CandidType, Deserialize, Validate, Clone, Debug)]
pub struct SubmitFriendRequestRequest {
    /// Replaces the identifier field before submitting when present.
    #[validate(length(max = 256))]
    pub user_id: Option<String>,
}

#[derive(CandidType, Deserialize, Validate, Clone, Debug)]
pub struct SearchExistingUsersRequest {
    #[validate(length(max = 200))]
    pub query: String,
}

#[derive(CandidType, Deserialize, Validate, Clone, Debug)]
pub struct SelectExistingUserRequest {
    #[validate(length(min = 1, max = 128))]
    pub existing_user_id: String,
}

#[derive(CandidType, Deserialize, Validate, Clone, Debug)]
pub struct UserIdInput {
    #[validate(length(max = 256))]
    pub raw: String,
}

// --- Modal Lifecycle ---

#[update]
fn open_acquisition_modal() -> Result<ModalView, AcquisitionError> {
    session_service::open_modal(authenticated_caller()?)
}

#[update]
fn close_acquisition_modal() -> Result<bool, AcquisitionError> {
    Ok(session_service::close_modal(&authenticated_caller()?))
}

#[query]
fn get_modal_view() -> Result<ModalView, AcquisitionError> {
    session_service::get_modal_view(&authenticated_caller()?)
}

// --- Form Events ---

#[update]
fn select_mode(mode: AcquisitionMode) -> Result<ModalView, AcquisitionError> {
    session_service::select_mode(&authenticated_caller()?, mode)
}

#[update]
fn set_relationship(relationship: Option<RelationshipKind>) -> Result<ModalView, AcquisitionError> {
    session_service::set_relationship(&authenticated_caller()?, relationship)
}

#[update]
fn update_new_member(edit: NewMemberEdit) -> Result<ModalView, AcquisitionError> {
    session_service::update_new_member(&authenticated_caller()?, edit)
}

#[update]
fn set_new_member_user_id(req: UserIdInput) -> Result<String, AcquisitionError> {
    validate_request(&req)?;
    session_service::set_new_member_user_id(&authenticated_caller()?, &req.raw)
        .map(|id| id.to_string())
}

#[update]
fn set_friend_request_user_id(req: UserIdInput) -> Result<String, AcquisitionError> {
    validate_request(&req)?;
    session_service::set_friend_request_user_id(&authenticated_caller()?, &req.raw)
        .map(|id| id.to_string())
}

/// Pure normalization preview, usable without an open modal.
#[query]
fn normalize_user_id(raw: String) -> String {
    normalize(&raw).to_string()
}

// --- Collaborator-backed Events ---

#[update]
async fn submit_friend_request(
    req: SubmitFriendRequestRequest,
) -> Result<FriendRequestAck, AcquisitionError> {
    validate_request(&req)?;
    let owner = authenticated_caller()?;
    check_cycles()?;
    session_service::submit_friend_request(&owner, req.user_id.as_deref(), &family_api()).await
}

#[update]
async fn handle_key_press(field: FormField, key: Key) -> Result<KeyPressResult, AcquisitionError> {
    let owner = authenticated_caller()?;
    if key == Key::Enter {
        check_cycles()?;
    }
    session_service::handle_key_press(&owner, field, key, &family_api()).await
}

#[update]
async fn refresh_existing_friends() -> Result<u64, AcquisitionError> {
    let owner = authenticated_caller()?;
    check_cycles()?;
    session_service::refresh_existing_friends(&owner, &family_api())
        .await
        .map(|count| count as u64)
}

#[update]
fn search_existing_users(
    req: SearchExistingUsersRequest,
) -> Result<Vec<SearchResultView>, AcquisitionError> {
    validate_request(&req)?;
    session_service::search_existing_users(&authenticated_caller()?, &req.query)
}

#[update]
async fn select_existing_user(req: SelectExistingUserRequest) -> Result<(), AcquisitionError> {
    validate_request(&req)?;
    let owner = authenticated_caller()?;
    check_cycles()?;
    session_service::select_existing_user(&owner, &req.existing_user_id, &family_api()).await
}

#[update]
async fn submit_new_member() -> Result<(), AcquisitionError> {
    let owner = authenticated_caller()?;
    check_cycles()?;
    session_service::submit_new_member(&owner, &family_api()).await
}

/// Outcall transform; the name is `family_api_adapter::TRANSFORM_METHOD`.
#[query]
fn transform_family_api_response(args: TransformArgs) -> HttpResponse {
    strip_response_headers(args)
}

// --- Admin & Monitoring ---

#[query]
fn get_metrics() -> AcquisitionMetrics {
    metrics::get_metrics()
}

#[query]
fn get_config() -> Result<ServiceConfig, AcquisitionError> {
    check_admin(caller())?;
    Ok(config::get_config())
}

#[update]
fn set_config(new_config: ServiceConfig) -> Result<ServiceConfig, AcquisitionError> {
    check_admin(caller())?;
    config::set_config(new_config)
}
