// src/backend/models/existing_user.rs
use crate::models::common::{ExistingUserId, RelationshipKind};
use crate::models::member_draft::NewMemberSubmission;
use crate::models::user_id::UserId;
use candid::CandidType;
use serde::{Deserialize, Serialize};

/// Candidate from the existing-friends directory. Older accounts may predate
/// User IDs, so `user_id` is optional and `email` is the fallback identifier.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExistingUser {
    pub id: ExistingUserId,
    #[serde(default)]
    pub user_id: Option<UserId>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub photo_url: Option<String>,
}

impl ExistingUser {
    /// `@userId` when the account has one, otherwise the email address.
    pub fn display_identifier(&self) -> String {
        match self.user_id.as_ref().filter(|id| !id.is_empty()) {
            Some(user_id) => format!("@{}", user_id),
            None => self.email.clone(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Search result as shown in the FindExistingUser list.
#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct SearchResultView {
    pub id: ExistingUserId,
    pub display_identifier: String,
    pub first_name: String,
    pub last_name: String,
    pub photo_url: Option<String>,
}

impl From<&ExistingUser> for SearchResultView {
    fn from(user: &ExistingUser) -> Self {
        SearchResultView {
            id: user.id.clone(),
            display_identifier: user.display_identifier(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            photo_url: user.photo_url.clone(),
        }
    }
}

/// Form state for the FindExistingUser mode.
#[derive(CandidType, Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchDraft {
    pub query: String,
    pub selected: Option<ExistingUserId>,
}

/// What the tree-mutation service is asked to attach.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TreeAttachment {
    NewMember(NewMemberSubmission),
    #[serde(rename_all = "camelCase")]
    ExistingUser {
        existing_user_id: ExistingUserId,
        relationship: RelationshipKind,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(user_id: Option<&str>) -> ExistingUser {
        ExistingUser {
            id: "u-1".to_string(),
            user_id: user_id.map(UserId::from),
            first_name: "Grace".to_string(),
            last_name: "Hopper".to_string(),
            email: "a@b.com".to_string(),
            photo_url: None,
        }
    }

    #[test]
    fn display_prefers_user_id() {
        assert_eq!(user(Some("user123abc")).display_identifier(), "@user123abc");
    }

    #[test]
    fn display_falls_back_to_email() {
        assert_eq!(user(None).display_identifier(), "a@b.com");
        assert_eq!(user(Some("")).display_identifier(), "a@b.com");
    }

    #[test]
    fn legacy_json_without_user_id_decodes() {
        let json = r#"{"id":"7","firstName":"Old","lastName":"Account","email":"old@example.com"}"#;
        let decoded: ExistingUser = serde_json::from_str(json).unwrap();
        assert_eq!(decoded.user_id, None);
        assert_eq!(decoded.display_identifier(), "old@example.com");
    }

    #[test]
    fn existing_user_attachment_is_tagged() {
        let attachment = TreeAttachment::ExistingUser {
            existing_user_id: "7".to_string(),
            relationship: RelationshipKind::Sibling,
        };
        let json = serde_json::to_value(&attachment).unwrap();
        assert_eq!(json["kind"], "existingUser");
        assert_eq!(json["existingUserId"], "7");
        assert_eq!(json["relationship"], "sibling");
    }
}
