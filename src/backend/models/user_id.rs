// src/backend/models/user_id.rs
use candid::CandidType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length of a canonical User ID.
pub const MAX_USER_ID_LEN: usize = 20;

/// Canonical account identifier: lowercase `[a-z0-9]`, at most 20 characters.
///
/// The only way to build one is through [`normalize_user_id`], so a `UserId`
/// is never held in un-normalized form. Values decoded from Candid or JSON are
/// normalized on the way in.
#[derive(CandidType, Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(from = "String")]
pub struct UserId(String);

/// Lowercases `raw`, drops everything outside `[a-z0-9]` and truncates to 20 characters.
pub fn normalize_user_id(raw: &str) -> UserId {
    let canonical: String = raw
        .chars()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .take(MAX_USER_ID_LEN)
        .collect();
    UserId(canonical)
}

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Empty is a valid intermediate value while typing but never submittable.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, fragment: &UserId) -> bool {
        self.0.contains(fragment.as_str())
    }
}

impl From<String> for UserId {
    fn from(raw: String) -> Self {
        normalize_user_id(&raw)
    }
}

impl From<&str> for UserId {
    fn from(raw: &str) -> Self {
        normalize_user_id(raw)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
