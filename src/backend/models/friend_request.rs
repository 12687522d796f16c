// src/backend/models/friend_request.rs
use crate::error::FriendRequestError;
use crate::models::user_id::{normalize_user_id, UserId};
use candid::CandidType;
use serde::{Deserialize, Serialize};

#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub enum FriendRequestState {
    Idle,
    Submitting,
    Succeeded { message: String },
    Failed(FriendRequestError),
}

impl Default for FriendRequestState {
    fn default() -> Self {
        FriendRequestState::Idle
    }
}

#[derive(CandidType, Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct FriendRequestDraft {
    pub target_user_id: UserId,
    pub state: FriendRequestState,
}

impl FriendRequestDraft {
    /// Replaces the identifier. Editing after a resolved submission clears the
    /// old outcome so it is never shown next to a different target.
    pub fn set_target(&mut self, raw: &str) -> UserId {
        self.target_user_id = normalize_user_id(raw);
        if !self.is_submitting() {
            self.state = FriendRequestState::Idle;
        }
        self.target_user_id.clone()
    }

    pub fn is_submitting(&self) -> bool {
        self.state == FriendRequestState::Submitting
    }
}

/// JSON body of `POST /api/family/friend-requests`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequestBody {
    pub user_id: UserId,
}

/// Confirmation returned by the friend-request service.
#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct FriendRequestAck {
    pub message: String,
}
