// src/backend/metrics.rs
use candid::CandidType;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;

/// Workflow counters. Heap only, reset on upgrade.
#[derive(CandidType, Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct AcquisitionMetrics {
    pub modals_opened: u64,
    pub friend_requests_sent: u64,
    pub friend_requests_succeeded: u64,
    pub friend_requests_failed: u64,
    pub local_validation_rejections: u64,
    pub members_added: u64,
    pub existing_users_attached: u64,
    pub late_results_dropped: u64,
}

thread_local! {
    static METRICS: RefCell<AcquisitionMetrics> = RefCell::new(AcquisitionMetrics::default());
}

pub fn update_metrics(f: impl FnOnce(&mut AcquisitionMetrics)) {
    METRICS.with(|metrics| f(&mut metrics.borrow_mut()));
}

pub fn get_metrics() -> AcquisitionMetrics {
    METRICS.with(|metrics| metrics.borrow().clone())
}

pub fn record_modal_opened() {
    update_metrics(|m| m.modals_opened = m.modals_opened.saturating_add(1));
}

pub fn record_local_rejection() {
    update_metrics(|m| {
        m.local_validation_rejections = m.local_validation_rejections.saturating_add(1)
    });
}

pub fn record_friend_request(succeeded: bool) {
    update_metrics(|m| {
        m.friend_requests_sent = m.friend_requests_sent.saturating_add(1);
        if succeeded {
            m.friend_requests_succeeded = m.friend_requests_succeeded.saturating_add(1);
        } else {
            m.friend_requests_failed = m.friend_requests_failed.saturating_add(1);
        }
    });
}

pub fn record_late_result_dropped() {
    update_metrics(|m| m.late_results_dropped = m.late_results_dropped.saturating_add(1));
}

pub fn record_member_added() {
    update_metrics(|m| m.members_added = m.members_added.saturating_add(1));
}

pub fn record_existing_user_attached() {
    update_metrics(|m| m.existing_users_attached = m.existing_users_attached.saturating_add(1));
}
