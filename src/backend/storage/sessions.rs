// src/backend/storage/sessions.rs
use crate::error::AcquisitionError;
use crate::models::common::{ModalInstanceId, OwnerId};
use crate::services::modal_controller::ModalController;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

thread_local! {
    // Open modals keyed by caller. Heap only: drafts never outlive the modal, and an upgrade closes them all.
    static SESSIONS: RefCell<HashMap<OwnerId, ModalController>> = RefCell::new(HashMap::new());
    static NEXT_INSTANCE: Cell<ModalInstanceId> = Cell::new(1);
}

/// Opens a fresh modal for `owner`, discarding any modal it already had open.
pub fn open(owner: OwnerId) -> ModalInstanceId {
    let instance = NEXT_INSTANCE.with(|next| {
        let id = next.get();
        next.set(id.wrapping_add(1));
        id
    });
    SESSIONS.with(|sessions| {
        sessions
            .borrow_mut()
            .insert(owner, ModalController::new(instance))
    });
    instance
}

/// Discards the owner's modal. Returns whether one was open.
pub fn close(owner: &OwnerId) -> bool {
    SESSIONS.with(|sessions| sessions.borrow_mut().remove(owner).is_some())
}

/// Closes the owner's modal only if it is still `instance`.
pub fn close_instance(owner: &OwnerId, instance: ModalInstanceId) -> bool {
    SESSIONS.with(|sessions| {
        let mut sessions = sessions.borrow_mut();
        let is_current = sessions
            .get(owner)
            .map_or(false, |modal| modal.instance() == instance);
        if is_current {
            sessions.remove(owner);
        }
        is_current
    })
}

pub fn with_session<R>(
    owner: &OwnerId,
    f: impl FnOnce(&ModalController) -> R,
) -> Result<R, AcquisitionError> {
    SESSIONS.with(|sessions| {
        sessions
            .borrow()
            .get(owner)
            .map(f)
            .ok_or(AcquisitionError::SessionNotFound)
    })
}

pub fn with_session_mut<R>(
    owner: &OwnerId,
    f: impl FnOnce(&mut ModalController) -> R,
) -> Result<R, AcquisitionError> {
    SESSIONS.with(|sessions| {
        sessions
            .borrow_mut()
            .get_mut(owner)
            .map(f)
            .ok_or(AcquisitionError::SessionNotFound)
    })
}

/// Runs `f` only when the owner's open modal is still `instance`. Used to apply
/// results that come back from a collaborator after an `await`; `None` means the
/// modal that asked is gone and the result must be dropped.
pub fn with_instance_mut<R>(
    owner: &OwnerId,
    instance: ModalInstanceId,
    f: impl FnOnce(&mut ModalController) -> R,
) -> Option<R> {
    SESSIONS.with(|sessions| {
        sessions
            .borrow_mut()
            .get_mut(owner)
            .filter(|modal| modal.instance() == instance)
            .map(f)
    })
}

#[cfg(test)]
fn open_count() -> usize {
    SESSIONS.with(|sessions| sessions.borrow().len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use candid::Principal;

    fn owner(byte: u8) -> OwnerId {
        Principal::from_slice(&[byte; 29])
    }

    #[test]
    fn reopening_replaces_the_modal() {
        let first = open(owner(1));
        let second = open(owner(1));
        assert_ne!(first, second);
        assert_eq!(open_count(), 1);
        assert_eq!(with_session(&owner(1), |m| m.instance()), Ok(second));
    }

    #[test]
    fn closed_modal_is_gone() {
        open(owner(2));
        assert!(close(&owner(2)));
        assert!(!close(&owner(2)));
        assert_eq!(
            with_session(&owner(2), |m| m.instance()),
            Err(AcquisitionError::SessionNotFound)
        );
    }

    #[test]
    fn instance_scoped_access_skips_replaced_modals() {
        let old = open(owner(3));
        let new = open(owner(3));
        assert_eq!(with_instance_mut(&owner(3), old, |m| m.instance()), None);
        assert_eq!(with_instance_mut(&owner(3), new, |m| m.instance()), Some(new));
        assert!(!close_instance(&owner(3), old));
        assert!(close_instance(&owner(3), new));
    }

    #[test]
    fn owners_are_isolated() {
        open(owner(4));
        open(owner(5));
        assert!(close(&owner(4)));
        assert!(with_session(&owner(5), |_| ()).is_ok());
    }
}
