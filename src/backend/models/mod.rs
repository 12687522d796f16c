pub mod common;
pub mod existing_user;
pub mod friend_request;
pub mod member_draft;
pub mod service_config;
pub mod user_id;

// Re-export common types/enums for easier access
pub use common::*;
pub use existing_user::{ExistingUser, SearchDraft, SearchResultView, TreeAttachment};
pub use friend_request::{FriendRequestAck, FriendRequestDraft, FriendRequestState};
pub use member_draft::{NewMemberDraft, NewMemberEdit, NewMemberSubmission};
pub use user_id::{normalize_user_id, UserId, MAX_USER_ID_LEN};
pub use service_config::{InitArgs, ServiceConfig};
