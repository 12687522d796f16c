// src/backend/services/modal_controller.rs
use crate::error::{AcquisitionError, FriendRequestError};
use crate::log_info;
use crate::models::{
    AcquisitionMode, DraftGeneration, ExistingUser, ExistingUserId, FormField, FriendRequestAck,
    FriendRequestDraft, Key, ModalInstanceId, NewMemberDraft, NewMemberEdit, RelationshipKind,
    SearchResultView, TreeAttachment, UserId,
};
use crate::services::friend_request_service::{self, PendingFriendRequest};
use crate::services::mode_machine::{AcquisitionForm, ModeMachine};
use crate::services::search_service;
use candid::CandidType;
use serde::Deserialize;

/// Mode payload as returned to the client.
#[derive(CandidType, Deserialize, Clone, Debug, PartialEq)]
pub enum FormView {
    AddNewMember(NewMemberDraft),
    SendFriendRequest(FriendRequestDraft),
    FindExistingUser {
        query: String,
        selected: Option<ExistingUserId>,
        results: Vec<SearchResultView>,
    },
}

#[derive(CandidType, Deserialize, Clone, Debug, PartialEq)]
pub struct ModalView {
    pub instance: ModalInstanceId,
    pub mode: AcquisitionMode,
    pub relationship: Option<RelationshipKind>,
    pub relationship_visible: bool,
    pub visible_fields: Vec<FormField>,
    pub required_fields: Vec<FormField>,
    pub form: FormView,
    pub request_in_flight: bool,
    pub tree_update_in_flight: bool,
}

/// What a key press asks the caller to do next.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyOutcome {
    Ignored,
    SubmitFriendRequest,
    CloseModal,
}

/// A validated tree attachment that has left the modal. The modal accepts no
/// other attachment until it resolves.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingTreeUpdate {
    pub instance: ModalInstanceId,
    pub generation: DraftGeneration,
    pub submission: u64,
    pub attachment: TreeAttachment,
}

/// One open instance of the relative acquisition modal. Owns the active mode,
/// its draft, the candidate pool and the in-flight guards. Dropping it discards everything.
#[derive(Clone, Debug)]
pub struct ModalController {
    instance: ModalInstanceId,
    machine: ModeMachine,
    candidates: Vec<ExistingUser>,
    in_flight: Option<PendingFriendRequest>,
    tree_update: Option<u64>,
    submissions: u64,
}

impl ModalController {
    pub fn new(instance: ModalInstanceId) -> Self {
        Self {
            instance,
            machine: ModeMachine::default(),
            candidates: Vec::new(),
            in_flight: None,
            tree_update: None,
            submissions: 0,
        }
    }

    pub fn instance(&self) -> ModalInstanceId {
        self.instance
    }

    pub fn mode(&self) -> AcquisitionMode {
        self.machine.mode()
    }

    pub fn relationship(&self) -> Option<RelationshipKind> {
        self.machine.relationship()
    }

    pub fn request_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn tree_update_in_flight(&self) -> bool {
        self.tree_update.is_some()
    }

    /// Sequence number of the next outgoing submission. Manual retries get a
    /// new number so the collaborator does not mistake them for redeliveries.
    fn next_submission(&mut self) -> u64 {
        self.submissions = self.submissions.wrapping_add(1);
        self.submissions
    }

    /// Mode switches are always allowed, even with a request in flight.
    pub fn select_mode(&mut self, mode: AcquisitionMode) -> bool {
        self.machine.select_mode(mode)
    }

    pub fn set_relationship(
        &mut self,
        relationship: Option<RelationshipKind>,
    ) -> Result<(), AcquisitionError> {
        self.machine.set_relationship(relationship)
    }

    fn wrong_mode(&self, expected: AcquisitionMode) -> AcquisitionError {
        AcquisitionError::WrongMode {
            expected,
            actual: self.mode(),
        }
    }

    fn new_member_draft_mut(&mut self) -> Result<&mut NewMemberDraft, AcquisitionError> {
        let err = self.wrong_mode(AcquisitionMode::AddNewMember);
        match self.machine.form_mut() {
            AcquisitionForm::AddNewMember(draft) => Ok(draft),
            _ => Err(err),
        }
    }

    fn friend_request_draft_mut(&mut self) -> Result<&mut FriendRequestDraft, AcquisitionError> {
        let err = self.wrong_mode(AcquisitionMode::SendFriendRequest);
        match self.machine.form_mut() {
            AcquisitionForm::SendFriendRequest(draft) => Ok(draft),
            _ => Err(err),
        }
    }

    pub fn edit_new_member(&mut self, edit: NewMemberEdit) -> Result<(), AcquisitionError> {
        self.new_member_draft_mut()?.apply(edit);
        Ok(())
    }

    pub fn set_new_member_user_id(&mut self, raw: &str) -> Result<UserId, AcquisitionError> {
        Ok(self.new_member_draft_mut()?.set_user_id(raw))
    }

    /// The identifier field is locked while a friend request is in flight.
    pub fn set_friend_request_user_id(&mut self, raw: &str) -> Result<UserId, AcquisitionError> {
        if self.in_flight.is_some() {
            return Err(AcquisitionError::RequestInFlight);
        }
        let draft = self.friend_request_draft_mut()?;
        if draft.is_submitting() {
            return Err(AcquisitionError::RequestInFlight);
        }
        Ok(draft.set_target(raw))
    }

    /// Enter inside the identifier field is the same as pressing submit.
    pub fn key_outcome(&self, field: FormField, key: Key) -> KeyOutcome {
        match (self.mode(), field, key) {
            (AcquisitionMode::SendFriendRequest, FormField::TargetUserId, Key::Enter) => {
                KeyOutcome::SubmitFriendRequest
            }
            (_, _, Key::Escape) => KeyOutcome::CloseModal,
            _ => KeyOutcome::Ignored,
        }
    }

    /// Local half of a friend-request submission. Only one request may be in
    /// flight per modal, including one started from an earlier visit to the mode.
    pub fn begin_friend_request(&mut self) -> Result<PendingFriendRequest, AcquisitionError> {
        if self.in_flight.is_some() {
            return Err(AcquisitionError::RequestInFlight);
        }
        let instance = self.instance;
        let generation = self.machine.generation();
        let draft = self.friend_request_draft_mut()?;
        let raw = draft.target_user_id.to_string();
        let user_id = friend_request_service::begin_submission(draft, &raw)?;

        let pending = PendingFriendRequest {
            instance,
            generation,
            submission: self.next_submission(),
            user_id,
        };
        self.in_flight = Some(pending.clone());
        Ok(pending)
    }

    /// Applies a collaborator answer. The in-flight guard is always released for
    /// this instance; the draft is only touched if it is still the one that sent
    /// the request. Returns whether the draft was updated.
    pub fn resolve_friend_request(
        &mut self,
        pending: &PendingFriendRequest,
        outcome: &Result<FriendRequestAck, FriendRequestError>,
    ) -> bool {
        if pending.instance != self.instance {
            return false;
        }
        if self.in_flight.as_ref() == Some(pending) {
            self.in_flight = None;
        }
        if pending.generation != self.machine.generation() {
            log_info!(
                "Friend request result for @{} arrived after its draft was discarded",
                pending.user_id
            );
            return false;
        }
        match self.machine.form_mut() {
            AcquisitionForm::SendFriendRequest(draft) => {
                friend_request_service::resolve_submission(draft, outcome);
                true
            }
            _ => false,
        }
    }

    pub fn set_candidates(&mut self, candidates: Vec<ExistingUser>) {
        self.candidates = candidates;
    }

    fn current_results(&self, query: &str) -> Vec<SearchResultView> {
        search_service::render_results(&search_service::search(query, &self.candidates))
    }

    /// Stores the query and returns the rendered matches.
    pub fn search(&mut self, query: &str) -> Result<Vec<SearchResultView>, AcquisitionError> {
        let err = self.wrong_mode(AcquisitionMode::FindExistingUser);
        match self.machine.form_mut() {
            AcquisitionForm::FindExistingUser(draft) => {
                draft.query = query.to_string();
                draft.selected = None;
            }
            _ => return Err(err),
        }
        Ok(self.current_results(query))
    }

    /// Picks a search result. Fails with `MissingRelationship` before anything
    /// else when no relationship has been chosen. Only results the current query
    /// shows can be picked.
    pub fn select_existing_user(
        &mut self,
        selected_id: &str,
    ) -> Result<TreeAttachment, AcquisitionError> {
        let query = match self.machine.form() {
            AcquisitionForm::FindExistingUser(draft) => draft.query.clone(),
            _ => return Err(self.wrong_mode(AcquisitionMode::FindExistingUser)),
        };
        let shown = search_service::search(&query, &self.candidates);
        let attachment = search_service::select_result(self.relationship(), &shown, selected_id)?;
        if let AcquisitionForm::FindExistingUser(draft) = self.machine.form_mut() {
            draft.selected = Some(selected_id.to_string());
        }
        Ok(attachment)
    }

    pub fn finalize_new_member(&self) -> Result<TreeAttachment, AcquisitionError> {
        match self.machine.form() {
            AcquisitionForm::AddNewMember(draft) => Ok(TreeAttachment::NewMember(
                draft.finalize(self.relationship())?,
            )),
            _ => Err(self.wrong_mode(AcquisitionMode::AddNewMember)),
        }
    }

    fn begin_tree_update(&mut self, attachment: TreeAttachment) -> PendingTreeUpdate {
        let submission = self.next_submission();
        self.tree_update = Some(submission);
        PendingTreeUpdate {
            instance: self.instance,
            generation: self.machine.generation(),
            submission,
            attachment,
        }
    }

    /// Validates the new-member draft and locks the modal against a second
    /// attachment until [`Self::end_tree_update`].
    pub fn begin_new_member_submission(&mut self) -> Result<PendingTreeUpdate, AcquisitionError> {
        if self.tree_update.is_some() {
            return Err(AcquisitionError::RequestInFlight);
        }
        let attachment = self.finalize_new_member()?;
        Ok(self.begin_tree_update(attachment))
    }

    pub fn begin_existing_user_attachment(
        &mut self,
        selected_id: &str,
    ) -> Result<PendingTreeUpdate, AcquisitionError> {
        if self.tree_update.is_some() {
            return Err(AcquisitionError::RequestInFlight);
        }
        let attachment = self.select_existing_user(selected_id)?;
        Ok(self.begin_tree_update(attachment))
    }

    /// Releases the attachment lock after a failed tree update.
    pub fn end_tree_update(&mut self, pending: &PendingTreeUpdate) {
        if self.tree_update == Some(pending.submission) {
            self.tree_update = None;
        }
    }

    pub fn view(&self) -> ModalView {
        let form = match self.machine.form() {
            AcquisitionForm::AddNewMember(draft) => FormView::AddNewMember(draft.clone()),
            AcquisitionForm::SendFriendRequest(draft) => FormView::SendFriendRequest(draft.clone()),
            AcquisitionForm::FindExistingUser(draft) => FormView::FindExistingUser {
                query: draft.query.clone(),
                selected: draft.selected.clone(),
                results: self.current_results(&draft.query),
            },
        };
        ModalView {
            instance: self.instance,
            mode: self.mode(),
            relationship: self.relationship(),
            relationship_visible: self.machine.relationship_visible(),
            visible_fields: self.machine.visible_fields().to_vec(),
            required_fields: self.machine.required_fields().to_vec(),
            form,
            request_in_flight: self.request_in_flight(),
            tree_update_in_flight: self.tree_update_in_flight(),
        }
    }
}
