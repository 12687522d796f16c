// src/backend/adapter/mod.rs
// Collaborator contracts consumed by the acquisition workflow.

pub mod family_api_adapter;

use crate::error::{AcquisitionError, FriendRequestError};
use crate::models::{
    DraftGeneration, ExistingUser, FriendRequestAck, ModalInstanceId, OwnerId, TreeAttachment,
    UserId,
};
use std::fmt;

pub use family_api_adapter::FamilyApiClient;

/// Names one user submission. Every delivery of the same submission carries the
/// same key, so the collaborator can apply it once.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct IdempotencyKey(String);

impl IdempotencyKey {
    pub fn new(
        owner: &OwnerId,
        instance: ModalInstanceId,
        generation: DraftGeneration,
        submission: u64,
    ) -> Self {
        IdempotencyKey(format!(
            "{}-{}-{}-{}",
            owner.to_text(),
            instance,
            generation,
            submission
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdempotencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Sends a friend request to the account named by a canonical User ID.
#[allow(async_fn_in_trait)]
pub trait FriendRequestClient {
    async fn send_friend_request(
        &self,
        user_id: &UserId,
        key: &IdempotencyKey,
    ) -> Result<FriendRequestAck, FriendRequestError>;
}

/// Supplies the candidate pool for existing-user search.
#[allow(async_fn_in_trait)]
pub trait FriendDirectory {
    async fn get_existing_friends(&self) -> Result<Vec<ExistingUser>, AcquisitionError>;
}

/// Performs the actual attachment to the family tree.
#[allow(async_fn_in_trait)]
pub trait TreeMutator {
    async fn attach(
        &self,
        attachment: &TreeAttachment,
        key: &IdempotencyKey,
    ) -> Result<(), AcquisitionError>;
}
