// src/backend/services/session_service.rs
// Binds caller events to the caller's open acquisition modal and to the collaborators.

use crate::adapter::{FriendDirectory, FriendRequestClient, IdempotencyKey, TreeMutator};
use crate::error::AcquisitionError;
use crate::metrics;
use crate::models::{
    AcquisitionMode, FormField, FriendRequestAck, Key, NewMemberEdit, OwnerId, RelationshipKind,
    SearchResultView, UserId,
};
use crate::services::friend_request_service;
use crate::services::modal_controller::{KeyOutcome, ModalView, PendingTreeUpdate};
use crate::storage::sessions;
use crate::{log_error, log_info, log_warn};
use candid::CandidType;
use serde::Deserialize;

#[derive(CandidType, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum KeyPressResult {
    Ignored,
    FriendRequestSent(FriendRequestAck),
    ModalClosed,
}

/// Counts failures detected before any collaborator call.
fn local<T>(result: Result<T, AcquisitionError>) -> Result<T, AcquisitionError> {
    if let Err(err) = &result {
        if err.is_local() {
            metrics::record_local_rejection();
        }
    }
    result
}

/// Opens a fresh modal in the default mode, replacing any modal the owner had open.
pub fn open_modal(owner: OwnerId) -> Result<ModalView, AcquisitionError> {
    let instance = sessions::open(owner);
    metrics::record_modal_opened();
    log_info!("Acquisition modal {} opened for {}", instance, owner.to_text());
    sessions::with_session(&owner, |modal| modal.view())
}

/// Discards every draft of the owner's modal. A request still in flight is not
/// cancelled, its answer is dropped when it arrives.
pub fn close_modal(owner: &OwnerId) -> bool {
    let closed = sessions::close(owner);
    if closed {
        log_info!("Acquisition modal closed for {}", owner.to_text());
    }
    closed
}

pub fn get_modal_view(owner: &OwnerId) -> Result<ModalView, AcquisitionError> {
    sessions::with_session(owner, |modal| modal.view())
}

pub fn select_mode(owner: &OwnerId, mode: AcquisitionMode) -> Result<ModalView, AcquisitionError> {
    sessions::with_session_mut(owner, |modal| {
        modal.select_mode(mode);
        modal.view()
    })
}

pub fn set_relationship(
    owner: &OwnerId,
    relationship: Option<RelationshipKind>,
) -> Result<ModalView, AcquisitionError> {
    local(
        sessions::with_session_mut(owner, |modal| {
            modal.set_relationship(relationship).map(|_| modal.view())
        })
        .and_then(|r| r),
    )
}

pub fn update_new_member(
    owner: &OwnerId,
    edit: NewMemberEdit,
) -> Result<ModalView, AcquisitionError> {
    local(
        sessions::with_session_mut(owner, |modal| modal.edit_new_member(edit).map(|_| modal.view()))
            .and_then(|r| r),
    )
}

pub fn set_new_member_user_id(owner: &OwnerId, raw: &str) -> Result<UserId, AcquisitionError> {
    local(sessions::with_session_mut(owner, |modal| modal.set_new_member_user_id(raw)).and_then(|r| r))
}

pub fn set_friend_request_user_id(owner: &OwnerId, raw: &str) -> Result<UserId, AcquisitionError> {
    local(
        sessions::with_session_mut(owner, |modal| modal.set_friend_request_user_id(raw))
            .and_then(|r| r),
    )
}

/// Submits the friend request of the owner's modal. When `raw_user_id` is given it
/// replaces the field content first, exactly as typing it would. Nothing in the
/// draft changes while an earlier request is still in flight.
pub async fn submit_friend_request<C: FriendRequestClient>(
    owner: &OwnerId,
    raw_user_id: Option<&str>,
    client: &C,
) -> Result<FriendRequestAck, AcquisitionError> {
    let pending = local(
        sessions::with_session_mut(owner, |modal| {
            if modal.request_in_flight() {
                return Err(AcquisitionError::RequestInFlight);
            }
            if let Some(raw) = raw_user_id {
                modal.set_friend_request_user_id(raw)?;
            }
            modal.begin_friend_request()
        })
        .and_then(|r| r),
    )?;

    let key = IdempotencyKey::new(owner, pending.instance, pending.generation, pending.submission);
    let outcome = friend_request_service::dispatch(client, &pending, &key).await;
    metrics::record_friend_request(outcome.is_ok());

    let applied = sessions::with_instance_mut(owner, pending.instance, |modal| {
        modal.resolve_friend_request(&pending, &outcome)
    });
    if applied.is_none() {
        log_warn!(
            "Modal {} closed before the friend request to @{} resolved; result dropped",
            pending.instance,
            pending.user_id
        );
        metrics::record_late_result_dropped();
    }

    outcome.map_err(AcquisitionError::from)
}

pub async fn handle_key_press<C: FriendRequestClient>(
    owner: &OwnerId,
    field: FormField,
    key: Key,
    client: &C,
) -> Result<KeyPressResult, AcquisitionError> {
    match sessions::with_session(owner, |modal| modal.key_outcome(field, key))? {
        KeyOutcome::Ignored => Ok(KeyPressResult::Ignored),
        KeyOutcome::SubmitFriendRequest => submit_friend_request(owner, None, client)
            .await
            .map(KeyPressResult::FriendRequestSent),
        KeyOutcome::CloseModal => {
            close_modal(owner);
            Ok(KeyPressResult::ModalClosed)
        }
    }
}

/// Loads the candidate pool for existing-user search into the owner's modal.
pub async fn refresh_existing_friends<D: FriendDirectory>(
    owner: &OwnerId,
    directory: &D,
) -> Result<usize, AcquisitionError> {
    let instance = sessions::with_session(owner, |modal| modal.instance())?;
    let friends = directory.get_existing_friends().await.map_err(|e| {
        log_error!("Existing friends could not be loaded: {}", e);
        e
    })?;
    let count = friends.len();
    match sessions::with_instance_mut(owner, instance, |modal| modal.set_candidates(friends)) {
        Some(()) => Ok(count),
        None => {
            metrics::record_late_result_dropped();
            Err(AcquisitionError::SessionNotFound)
        }
    }
}

pub fn search_existing_users(
    owner: &OwnerId,
    query: &str,
) -> Result<Vec<SearchResultView>, AcquisitionError> {
    local(sessions::with_session_mut(owner, |modal| modal.search(query)).and_then(|r| r))
}

/// Attaches the picked search result with the chosen relationship. The tree
/// collaborator is only called once local validation passed; success closes the modal.
pub async fn select_existing_user<T: TreeMutator>(
    owner: &OwnerId,
    selected_id: &str,
    tree: &T,
) -> Result<(), AcquisitionError> {
    let pending = local(
        sessions::with_session_mut(owner, |modal| {
            modal.begin_existing_user_attachment(selected_id)
        })
        .and_then(|r| r),
    )?;
    attach(owner, &pending, tree).await?;
    metrics::record_existing_user_attached();
    Ok(())
}

/// Validates the new-member draft and hands it to the tree collaborator. Success
/// closes the modal; failure keeps the draft for correction.
pub async fn submit_new_member<T: TreeMutator>(
    owner: &OwnerId,
    tree: &T,
) -> Result<(), AcquisitionError> {
    let pending = local(
        sessions::with_session_mut(owner, |modal| modal.begin_new_member_submission())
            .and_then(|r| r),
    )?;
    attach(owner, &pending, tree).await?;
    metrics::record_member_added();
    Ok(())
}

/// The modal stays locked against another attachment until the tree
/// collaborator answers.
async fn attach<T: TreeMutator>(
    owner: &OwnerId,
    pending: &PendingTreeUpdate,
    tree: &T,
) -> Result<(), AcquisitionError> {
    let key = IdempotencyKey::new(owner, pending.instance, pending.generation, pending.submission);
    if let Err(err) = tree.attach(&pending.attachment, &key).await {
        log_error!("Tree update from modal {} failed: {}", pending.instance, err);
        sessions::with_instance_mut(owner, pending.instance, |modal| {
            modal.end_tree_update(pending)
        });
        return Err(err);
    }
    log_info!("🌳 Tree updated from modal {}", pending.instance);
    sessions::close_instance(owner, pending.instance);
    Ok(())
}
