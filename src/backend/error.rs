// src/backend/error.rs
use crate::models::common::{AcquisitionMode, FormField};
use candid::CandidType;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures reported by the friend-request collaborator.
#[derive(CandidType, Deserialize, Serialize, Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FriendRequestError {
    #[error("No account exists with that User ID")]
    NotFound,

    #[error("You are already friends with this user")]
    AlreadyFriends,

    #[error("A friend request to this user is already pending")]
    AlreadyPending,

    #[error("You cannot send a friend request to yourself")]
    SelfRequest,

    #[error("The friend request service could not be reached")]
    NetworkError,

    #[error("The friend request failed for an unknown reason")]
    Unknown,
}

#[derive(CandidType, Deserialize, Error, Debug, Clone, PartialEq, Eq)]
pub enum AcquisitionError {
    #[error("User ID is empty")]
    EmptyIdentifier,

    #[error("A relationship must be chosen first")]
    MissingRelationship,

    #[error("Required field missing: {0:?}")]
    MissingField(FormField),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("A friend request is already in flight for this modal")]
    RequestInFlight,

    #[error("Relationship is not collected when sending a friend request")]
    RelationshipNotCollected,

    #[error("Operation requires mode {expected:?} but {actual:?} is active")]
    WrongMode {
        expected: AcquisitionMode,
        actual: AcquisitionMode,
    },

    #[error("Search result not found: {0}")]
    ResultNotFound(String),

    #[error("No acquisition modal is open for this caller")]
    SessionNotFound,

    #[error("Friend request failed: {0}")]
    FriendRequest(FriendRequestError),

    #[error("Existing friends could not be loaded: {0}")]
    DirectoryUnavailable(String),

    #[error("Tree update failed: {0}")]
    TreeMutationFailed(String),

    #[error("Not authorized: {0}")]
    NotAuthorized(String),

    #[error("Canister cycle balance too low for operation")]
    CycleLow,

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<FriendRequestError> for AcquisitionError {
    fn from(err: FriendRequestError) -> Self {
        AcquisitionError::FriendRequest(err)
    }
}

impl AcquisitionError {
    /// True for failures detected before any collaborator is contacted.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            AcquisitionError::EmptyIdentifier
                | AcquisitionError::MissingRelationship
                | AcquisitionError::MissingField(_)
                | AcquisitionError::InvalidInput(_)
                | AcquisitionError::RequestInFlight
                | AcquisitionError::RelationshipNotCollected
                | AcquisitionError::WrongMode { .. }
                | AcquisitionError::ResultNotFound(_)
        )
    }
}
