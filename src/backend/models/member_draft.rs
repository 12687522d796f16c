// src/backend/models/member_draft.rs
use crate::error::AcquisitionError;
use crate::models::common::{FormField, LifeStatus, RelationshipKind};
use crate::models::user_id::{normalize_user_id, UserId};
use candid::CandidType;
use serde::{Deserialize, Serialize};
use validator::Validate;

const MIN_BIRTH_YEAR: u16 = 1000;
const MAX_BIRTH_YEAR: u16 = 9999;

/// Form state for a brand-new family member. Created empty when the
/// AddNewMember mode is entered.
#[derive(CandidType, Deserialize, Serialize, Clone, Debug, Default, PartialEq, Validate)]
pub struct NewMemberDraft {
    #[validate(length(max = 100))]
    pub first_name: String,
    #[validate(length(max = 100))]
    pub last_name: String,
    pub user_id: UserId,
    pub birth_year: Option<u16>,
    pub status: Option<LifeStatus>,
    #[validate(length(max = 40))]
    pub tag: Option<String>,
    #[validate(length(max = 2048))]
    pub photo: Option<String>, // URL or upload reference
}

/// Single-field edit coming from the form. User ID edits are not in here
/// because they go through normalization on every keystroke.
#[derive(CandidType, Deserialize, Clone, Debug, PartialEq)]
pub enum NewMemberEdit {
    FirstName(String),
    LastName(String),
    BirthYear(Option<u16>),
    Status(Option<LifeStatus>),
    Tag(Option<String>),
    Photo(Option<String>),
}

/// A draft that passed validation, ready for the tree-mutation service.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewMemberSubmission {
    pub first_name: String,
    pub last_name: String,
    pub user_id: UserId,
    pub relationship: RelationshipKind,
    pub birth_year: u16,
    pub status: LifeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}

impl NewMemberDraft {
    pub fn apply(&mut self, edit: NewMemberEdit) {
        match edit {
            NewMemberEdit::FirstName(v) => self.first_name = v,
            NewMemberEdit::LastName(v) => self.last_name = v,
            NewMemberEdit::BirthYear(v) => self.birth_year = v,
            NewMemberEdit::Status(v) => self.status = v,
            NewMemberEdit::Tag(v) => self.tag = v.filter(|t| !t.trim().is_empty()),
            NewMemberEdit::Photo(v) => self.photo = v.filter(|p| !p.trim().is_empty()),
        }
    }

    /// Normalizes the raw keystroke input and returns the value the field now shows.
    pub fn set_user_id(&mut self, raw: &str) -> UserId {
        self.user_id = normalize_user_id(raw);
        self.user_id.clone()
    }

    /// Checks every required field and the free-text limits. The draft is left untouched
    /// so the caller can correct and resubmit.
    pub fn finalize(
        &self,
        relationship: Option<RelationshipKind>,
    ) -> Result<NewMemberSubmission, AcquisitionError> {
        if self.first_name.trim().is_empty() {
            return Err(AcquisitionError::MissingField(FormField::FirstName));
        }
        if self.last_name.trim().is_empty() {
            return Err(AcquisitionError::MissingField(FormField::LastName));
        }
        if self.user_id.is_empty() {
            return Err(AcquisitionError::EmptyIdentifier);
        }
        let relationship = relationship.ok_or(AcquisitionError::MissingRelationship)?;
        let birth_year = self
            .birth_year
            .ok_or(AcquisitionError::MissingField(FormField::BirthYear))?;
        if !(MIN_BIRTH_YEAR..=MAX_BIRTH_YEAR).contains(&birth_year) {
            return Err(AcquisitionError::InvalidInput(format!(
                "birth year {} is outside {}..={}",
                birth_year, MIN_BIRTH_YEAR, MAX_BIRTH_YEAR
            )));
        }
        let status = self
            .status
            .ok_or(AcquisitionError::MissingField(FormField::Status))?;

        self.validate()
            .map_err(|e| AcquisitionError::InvalidInput(e.to_string()))?;

        Ok(NewMemberSubmission {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            user_id: self.user_id.clone(),
            relationship,
            birth_year,
            status,
            tag: self.tag.clone(),
            photo: self.photo.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_draft() -> NewMemberDraft {
        let mut draft = NewMemberDraft::default();
        draft.apply(NewMemberEdit::FirstName("Ada".to_string()));
        draft.apply(NewMemberEdit::LastName("Lovelace".to_string()));
        draft.set_user_id("Ada_1815");
        draft.apply(NewMemberEdit::BirthYear(Some(1815)));
        draft.apply(NewMemberEdit::Status(Some(LifeStatus::Deceased)));
        draft
    }

    #[test]
    fn complete_draft_finalizes() {
        let submission = complete_draft()
            .finalize(Some(RelationshipKind::Parent))
            .unwrap();
        assert_eq!(submission.user_id.as_str(), "ada1815");
        assert_eq!(submission.relationship, RelationshipKind::Parent);
        assert_eq!(submission.status, LifeStatus::Deceased);
    }

    #[test]
    fn missing_relationship_is_reported() {
        assert_eq!(
            complete_draft().finalize(None),
            Err(AcquisitionError::MissingRelationship)
        );
    }

    #[test]
    fn blank_user_id_is_empty_identifier() {
        let mut draft = complete_draft();
        draft.set_user_id(" -- ");
        assert_eq!(
            draft.finalize(Some(RelationshipKind::Child)),
            Err(AcquisitionError::EmptyIdentifier)
        );
    }

    #[test]
    fn required_fields_are_named() {
        let mut draft = complete_draft();
        draft.apply(NewMemberEdit::FirstName("  ".to_string()));
        assert_eq!(
            draft.finalize(Some(RelationshipKind::Child)),
            Err(AcquisitionError::MissingField(FormField::FirstName))
        );

        let mut draft = complete_draft();
        draft.apply(NewMemberEdit::BirthYear(None));
        assert_eq!(
            draft.finalize(Some(RelationshipKind::Child)),
            Err(AcquisitionError::MissingField(FormField::BirthYear))
        );

        let mut draft = complete_draft();
        draft.apply(NewMemberEdit::Status(None));
        assert_eq!(
            draft.finalize(Some(RelationshipKind::Child)),
            Err(AcquisitionError::MissingField(FormField::Status))
        );
    }

    #[test]
    fn overlong_tag_is_invalid_input() {
        let mut draft = complete_draft();
        draft.apply(NewMemberEdit::Tag(Some("x".repeat(41))));
        assert!(matches!(
            draft.finalize(Some(RelationshipKind::Sibling)),
            Err(AcquisitionError::InvalidInput(_))
        ));
    }

    #[test]
    fn submission_serializes_camel_case() {
        let submission = complete_draft()
            .finalize(Some(RelationshipKind::Spouse))
            .unwrap();
        let json = serde_json::to_value(&submission).unwrap();
        assert_eq!(json["firstName"], "Ada");
        assert_eq!(json["userId"], "ada1815");
        assert_eq!(json["relationship"], "spouse");
        assert!(json.get("tag").is_none());
    }
}
