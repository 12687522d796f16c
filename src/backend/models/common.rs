// src/backend/models/common.rs
use candid::{CandidType, Principal};
use serde::{Deserialize, Serialize};

pub type OwnerId = Principal;        // Principal that owns an open acquisition modal
pub type ModalInstanceId = u64;      // Unique per opened modal, never reused
pub type DraftGeneration = u64;      // Bumped every time a mode is (re-)entered
pub type ExistingUserId = String;    // Account id from the friends directory

#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq, Hash, Copy)]
pub enum AcquisitionMode {
    AddNewMember,
    SendFriendRequest,
    FindExistingUser,
}

impl AcquisitionMode {
    /// Relationship is assigned after acceptance for friend requests, so that mode never collects it.
    pub fn collects_relationship(self) -> bool {
        !matches!(self, AcquisitionMode::SendFriendRequest)
    }
}

impl Default for AcquisitionMode {
    fn default() -> Self {
        AcquisitionMode::AddNewMember
    }
}

#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq, Hash, Copy)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipKind {
    Parent,
    Spouse,
    Child,
    Sibling,
}

#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq, Copy)]
#[serde(rename_all = "lowercase")]
pub enum LifeStatus {
    Living,
    Deceased,
}

#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq, Hash, Copy)]
pub enum FormField {
    Relationship,
    FirstName,
    LastName,
    UserId,
    BirthYear,
    Status,
    Tag,
    Photo,
    TargetUserId, // Friend request identifier input
    SearchQuery,
}

#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq, Copy)]
pub enum Key {
    Enter,
    Escape,
    Tab,
    Other,
}
