// src/backend/services/friend_request_service.rs
use crate::adapter::{FriendRequestClient, IdempotencyKey};
use crate::error::{AcquisitionError, FriendRequestError};
use crate::models::{
    normalize_user_id, DraftGeneration, FriendRequestAck, FriendRequestDraft, FriendRequestState,
    ModalInstanceId, UserId,
};
use crate::{log_info, log_warn};

/// Ticket for a friend request that left the modal and is awaiting the collaborator.
/// The instance/generation pair identifies which modal and which draft it belongs to;
/// `submission` tells manual retries apart.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingFriendRequest {
    pub instance: ModalInstanceId,
    pub generation: DraftGeneration,
    pub submission: u64,
    pub user_id: UserId,
}

/// Validates the identifier and moves the draft `Idle -> Submitting`.
///
/// An identifier that normalizes to empty fails with `EmptyIdentifier` and the
/// draft state is left alone. A draft that is already submitting is rejected.
pub fn begin_submission(
    draft: &mut FriendRequestDraft,
    raw_user_id: &str,
) -> Result<UserId, AcquisitionError> {
    if draft.is_submitting() {
        return Err(AcquisitionError::RequestInFlight);
    }
    let user_id = normalize_user_id(raw_user_id);
    if user_id.is_empty() {
        return Err(AcquisitionError::EmptyIdentifier);
    }
    draft.target_user_id = user_id.clone();
    draft.state = FriendRequestState::Submitting;
    Ok(user_id)
}

/// Records the collaborator's answer on the draft.
pub fn resolve_submission(
    draft: &mut FriendRequestDraft,
    outcome: &Result<FriendRequestAck, FriendRequestError>,
) {
    draft.state = match outcome {
        Ok(ack) => FriendRequestState::Succeeded {
            message: ack.message.clone(),
        },
        Err(reason) => FriendRequestState::Failed(*reason),
    };
}

/// Hands a validated request to the friend-request collaborator. No retry:
/// resubmitting is a user action.
pub async fn dispatch<C: FriendRequestClient>(
    client: &C,
    pending: &PendingFriendRequest,
    key: &IdempotencyKey,
) -> Result<FriendRequestAck, FriendRequestError> {
    log_info!(
        "✉️ Sending friend request to @{} (modal {})",
        pending.user_id,
        pending.instance
    );
    let outcome = client.send_friend_request(&pending.user_id, key).await;
    match &outcome {
        Ok(ack) => log_info!("✅ Friend request to @{} accepted: {}", pending.user_id, ack.message),
        Err(reason) => log_warn!("Friend request to @{} failed: {:?}", pending.user_id, reason),
    }
    outcome
}
