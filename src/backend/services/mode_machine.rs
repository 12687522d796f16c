// src/backend/services/mode_machine.rs
use crate::error::AcquisitionError;
use crate::log_info;
use crate::models::{
    AcquisitionMode, DraftGeneration, FormField, FriendRequestDraft, NewMemberDraft,
    RelationshipKind, SearchDraft,
};

/// Mode-specific form payload. Exactly one mode is active at a time and each
/// carries only its own draft.
#[derive(Clone, Debug, PartialEq)]
pub enum AcquisitionForm {
    AddNewMember(NewMemberDraft),
    SendFriendRequest(FriendRequestDraft),
    FindExistingUser(SearchDraft),
}

impl AcquisitionForm {
    /// Fresh, empty draft for `mode`.
    pub fn empty(mode: AcquisitionMode) -> Self {
        match mode {
            AcquisitionMode::AddNewMember => AcquisitionForm::AddNewMember(NewMemberDraft::default()),
            AcquisitionMode::SendFriendRequest => {
                AcquisitionForm::SendFriendRequest(FriendRequestDraft::default())
            }
            AcquisitionMode::FindExistingUser => {
                AcquisitionForm::FindExistingUser(SearchDraft::default())
            }
        }
    }

    pub fn mode(&self) -> AcquisitionMode {
        match self {
            AcquisitionForm::AddNewMember(_) => AcquisitionMode::AddNewMember,
            AcquisitionForm::SendFriendRequest(_) => AcquisitionMode::SendFriendRequest,
            AcquisitionForm::FindExistingUser(_) => AcquisitionMode::FindExistingUser,
        }
    }
}

const ADD_NEW_MEMBER_VISIBLE: &[FormField] = &[
    FormField::Relationship,
    FormField::FirstName,
    FormField::LastName,
    FormField::UserId,
    FormField::BirthYear,
    FormField::Status,
    FormField::Tag,
    FormField::Photo,
];
const ADD_NEW_MEMBER_REQUIRED: &[FormField] = &[
    FormField::Relationship,
    FormField::FirstName,
    FormField::LastName,
    FormField::UserId,
    FormField::BirthYear,
    FormField::Status,
];
const SEND_FRIEND_REQUEST_FIELDS: &[FormField] = &[FormField::TargetUserId];
const FIND_EXISTING_VISIBLE: &[FormField] = &[FormField::Relationship, FormField::SearchQuery];
const FIND_EXISTING_REQUIRED: &[FormField] = &[FormField::Relationship];

/// Tab state of the acquisition modal.
///
/// Transitions happen only through [`ModeMachine::select_mode`]. Entering
/// SendFriendRequest clears the relationship, and nothing restores it afterwards;
/// moving between AddNewMember and FindExistingUser keeps it.
#[derive(Clone, Debug)]
pub struct ModeMachine {
    form: AcquisitionForm,
    relationship: Option<RelationshipKind>,
    generation: DraftGeneration,
}

impl Default for ModeMachine {
    fn default() -> Self {
        Self::new(AcquisitionMode::default())
    }
}

impl ModeMachine {
    pub fn new(initial: AcquisitionMode) -> Self {
        Self {
            form: AcquisitionForm::empty(initial),
            relationship: None,
            generation: 0,
        }
    }

    pub fn mode(&self) -> AcquisitionMode {
        self.form.mode()
    }

    pub fn form(&self) -> &AcquisitionForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut AcquisitionForm {
        &mut self.form
    }

    /// Identifies the current draft; bumped whenever a mode is entered.
    pub fn generation(&self) -> DraftGeneration {
        self.generation
    }

    pub fn relationship(&self) -> Option<RelationshipKind> {
        self.relationship
    }

    pub fn relationship_visible(&self) -> bool {
        self.mode().collects_relationship()
    }

    pub fn set_relationship(
        &mut self,
        relationship: Option<RelationshipKind>,
    ) -> Result<(), AcquisitionError> {
        if !self.relationship_visible() {
            return Err(AcquisitionError::RelationshipNotCollected);
        }
        self.relationship = relationship;
        Ok(())
    }

    /// Switches tabs. Returns `false` when `mode` is already active, in which
    /// case the current draft is kept as is.
    pub fn select_mode(&mut self, mode: AcquisitionMode) -> bool {
        let from = self.mode();
        if from == mode {
            return false;
        }
        if !mode.collects_relationship() {
            self.relationship = None;
        }
        self.form = AcquisitionForm::empty(mode);
        self.generation = self.generation.wrapping_add(1);
        log_info!(
            "Acquisition mode {:?} -> {:?} (relationship {:?})",
            from,
            mode,
            self.relationship
        );
        true
    }

    pub fn visible_fields(&self) -> &'static [FormField] {
        match self.mode() {
            AcquisitionMode::AddNewMember => ADD_NEW_MEMBER_VISIBLE,
            AcquisitionMode::SendFriendRequest => SEND_FRIEND_REQUEST_FIELDS,
            AcquisitionMode::FindExistingUser => FIND_EXISTING_VISIBLE,
        }
    }

    pub fn required_fields(&self) -> &'static [FormField] {
        match self.mode() {
            AcquisitionMode::AddNewMember => ADD_NEW_MEMBER_REQUIRED,
            AcquisitionMode::SendFriendRequest => SEND_FRIEND_REQUEST_FIELDS,
            AcquisitionMode::FindExistingUser => FIND_EXISTING_REQUIRED,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewMemberEdit;

    #[test]
    fn starts_in_add_new_member_with_no_relationship() {
        let machine = ModeMachine::default();
        assert_eq!(machine.mode(), AcquisitionMode::AddNewMember);
        assert_eq!(machine.relationship(), None);
        assert!(machine.relationship_visible());
    }

    #[test]
    fn friend_request_detour_clears_relationship() {
        let mut machine = ModeMachine::default();
        machine.set_relationship(Some(RelationshipKind::Parent)).unwrap();

        machine.select_mode(AcquisitionMode::SendFriendRequest);
        assert!(!machine.relationship_visible());
        assert_eq!(machine.relationship(), None);

        machine.select_mode(AcquisitionMode::AddNewMember);
        assert!(machine.relationship_visible());
        assert_eq!(machine.relationship(), None);
    }

    #[test]
    fn relationship_survives_between_member_and_search_modes() {
        let mut machine = ModeMachine::default();
        machine.set_relationship(Some(RelationshipKind::Spouse)).unwrap();

        machine.select_mode(AcquisitionMode::FindExistingUser);
        assert_eq!(machine.relationship(), Some(RelationshipKind::Spouse));

        machine.select_mode(AcquisitionMode::AddNewMember);
        assert_eq!(machine.relationship(), Some(RelationshipKind::Spouse));
    }

    #[test]
    fn relationship_rejected_in_friend_request_mode() {
        let mut machine = ModeMachine::new(AcquisitionMode::SendFriendRequest);
        assert_eq!(
            machine.set_relationship(Some(RelationshipKind::Child)),
            Err(AcquisitionError::RelationshipNotCollected)
        );
    }

    #[test]
    fn switching_discards_mode_draft() {
        let mut machine = ModeMachine::default();
        if let AcquisitionForm::AddNewMember(draft) = machine.form_mut() {
            draft.apply(NewMemberEdit::FirstName("Ada".to_string()));
        }
        let before = machine.generation();

        assert!(machine.select_mode(AcquisitionMode::FindExistingUser));
        assert!(machine.select_mode(AcquisitionMode::AddNewMember));

        assert_eq!(machine.generation(), before + 2);
        assert_eq!(
            machine.form(),
            &AcquisitionForm::AddNewMember(NewMemberDraft::default())
        );
    }

    #[test]
    fn reselecting_active_mode_keeps_draft() {
        let mut machine = ModeMachine::default();
        if let AcquisitionForm::AddNewMember(draft) = machine.form_mut() {
            draft.apply(NewMemberEdit::LastName("Byron".to_string()));
        }
        assert!(!machine.select_mode(AcquisitionMode::AddNewMember));
        match machine.form() {
            AcquisitionForm::AddNewMember(draft) => assert_eq!(draft.last_name, "Byron"),
            other => panic!("unexpected form {:?}", other),
        }
    }

    #[test]
    fn field_visibility_per_mode() {
        let mut machine = ModeMachine::default();
        assert!(machine.required_fields().contains(&FormField::BirthYear));
        assert!(!machine.required_fields().contains(&FormField::Tag));
        assert!(machine.visible_fields().contains(&FormField::Tag));

        machine.select_mode(AcquisitionMode::SendFriendRequest);
        assert_eq!(machine.visible_fields(), &[FormField::TargetUserId]);
        assert!(!machine.visible_fields().contains(&FormField::Relationship));

        machine.select_mode(AcquisitionMode::FindExistingUser);
        assert_eq!(machine.required_fields(), &[FormField::Relationship]);
    }
}
