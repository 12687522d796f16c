// src/backend/adapter/family_api_adapter.rs
use crate::adapter::{FriendDirectory, FriendRequestClient, IdempotencyKey, TreeMutator};
use crate::error::{AcquisitionError, FriendRequestError};
use crate::models::friend_request::FriendRequestBody;
use crate::models::{ExistingUser, FriendRequestAck, ServiceConfig, TreeAttachment, UserId};
use crate::{log_error, log_info};
use candid::Nat;
use ic_cdk::api::management_canister::http_request::{
    http_request, CanisterHttpRequestArgument, HttpHeader, HttpMethod, HttpResponse,
    TransformArgs, TransformContext,
};
use num::ToPrimitive;
use serde::Deserialize;

const FRIEND_REQUESTS_PATH: &str = "/api/family/friend-requests";
const EXISTING_FRIENDS_PATH: &str = "/api/family/friends";
const TREE_MEMBERS_PATH: &str = "/api/family/members";

/// Canister query every outcall response passes through before consensus.
pub const TRANSFORM_METHOD: &str = "transform_family_api_response";

/// Error payload returned by the family API on non-2xx responses.
#[derive(Deserialize, Debug, Default)]
struct ApiErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

/// Raw HTTP result, decoupled from the outcall so the mapping can be tested natively.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Family API client backed by IC HTTP outcalls.
#[derive(Clone, Debug)]
pub struct FamilyApiClient {
    base_url: String,
    outcall_cycles: u128,
    max_response_bytes: u64,
}

impl FamilyApiClient {
    pub fn new(config: &ServiceConfig) -> Self {
        Self {
            base_url: config.api_base_url.clone(),
            outcall_cycles: config.http_outcall_cycles,
            max_response_bytes: config.max_response_bytes,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn build_request(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<Vec<u8>>,
        key: Option<&IdempotencyKey>,
    ) -> CanisterHttpRequestArgument {
        let mut headers = vec![HttpHeader {
            name: String::from("Accept"),
            value: String::from("application/json"),
        }];
        if body.is_some() {
            headers.push(HttpHeader {
                name: String::from("Content-Type"),
                value: String::from("application/json"),
            });
        }
        // Every replica sends the request; the key lets the API apply it once.
        if let Some(key) = key {
            headers.push(HttpHeader {
                name: String::from("Idempotency-Key"),
                value: key.to_string(),
            });
        }
        CanisterHttpRequestArgument {
            url: self.url(path),
            method,
            body,
            max_response_bytes: Some(self.max_response_bytes),
            transform: None,
            headers,
        }
    }

    /// Performs the outcall. `Err` carries the rejection message when the call never produced a response.
    async fn execute(
        &self,
        mut request: CanisterHttpRequestArgument,
    ) -> Result<RawResponse, String> {
        request.transform = Some(TransformContext::from_name(
            TRANSFORM_METHOD.to_string(),
            vec![],
        ));
        let url = request.url.clone();
        match http_request(request, self.outcall_cycles).await {
            Ok((response,)) => {
                let status = status_code(&response.status);
                log_info!("🔗 {} answered with status {}", url, status);
                Ok(RawResponse {
                    status,
                    body: response.body,
                })
            }
            Err((code, msg)) => {
                log_error!("HTTP outcall to {} failed: {:?} - {}", url, code, msg);
                Err(format!("{:?} - {}", code, msg))
            }
        }
    }
}

impl FriendRequestClient for FamilyApiClient {
    async fn send_friend_request(
        &self,
        user_id: &UserId,
        key: &IdempotencyKey,
    ) -> Result<FriendRequestAck, FriendRequestError> {
        let body = serde_json::to_vec(&FriendRequestBody {
            user_id: user_id.clone(),
        })
        .map_err(|_| FriendRequestError::Unknown)?;
        let request =
            self.build_request(HttpMethod::POST, FRIEND_REQUESTS_PATH, Some(body), Some(key));
        match self.execute(request).await {
            Ok(response) => map_friend_request_response(&response),
            Err(_) => Err(FriendRequestError::NetworkError),
        }
    }
}

impl FriendDirectory for FamilyApiClient {
    async fn get_existing_friends(&self) -> Result<Vec<ExistingUser>, AcquisitionError> {
        let request = self.build_request(HttpMethod::GET, EXISTING_FRIENDS_PATH, None, None);
        let response = self
            .execute(request)
            .await
            .map_err(AcquisitionError::DirectoryUnavailable)?;
        decode_existing_friends(&response)
    }
}

impl TreeMutator for FamilyApiClient {
    async fn attach(
        &self,
        attachment: &TreeAttachment,
        key: &IdempotencyKey,
    ) -> Result<(), AcquisitionError> {
        let body = serde_json::to_vec(attachment)
            .map_err(|e| AcquisitionError::SerializationError(e.to_string()))?;
        let request =
            self.build_request(HttpMethod::POST, TREE_MEMBERS_PATH, Some(body), Some(key));
        let response = self
            .execute(request)
            .await
            .map_err(AcquisitionError::TreeMutationFailed)?;
        map_tree_response(&response)
    }
}

/// Drops the response headers. They carry dates and request ids that differ
/// between replicas and would keep them from agreeing on one response.
pub fn strip_response_headers(args: TransformArgs) -> HttpResponse {
    HttpResponse {
        status: args.response.status,
        headers: vec![],
        body: args.response.body,
    }
}

/// Outcall statuses arrive as `Nat`; anything unrepresentable becomes 0 and maps to `Unknown`.
fn status_code(status: &Nat) -> u16 {
    status.0.to_u16().unwrap_or(0)
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

fn error_from_code(code: &str) -> Option<FriendRequestError> {
    match code {
        "NOT_FOUND" => Some(FriendRequestError::NotFound),
        "ALREADY_FRIENDS" => Some(FriendRequestError::AlreadyFriends),
        "ALREADY_PENDING" => Some(FriendRequestError::AlreadyPending),
        "SELF_REQUEST" => Some(FriendRequestError::SelfRequest),
        _ => None,
    }
}

fn error_message(body: &[u8]) -> String {
    serde_json::from_slice::<ApiErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .unwrap_or_else(|| String::from_utf8_lossy(body).into_owned())
}

/// Maps a friend-request response onto the collaborator error taxonomy.
/// A recognised `code` in the error body wins over the HTTP status.
pub fn map_friend_request_response(
    response: &RawResponse,
) -> Result<FriendRequestAck, FriendRequestError> {
    if is_success(response.status) {
        return serde_json::from_slice::<FriendRequestAck>(&response.body)
            .map_err(|_| FriendRequestError::Unknown);
    }

    let code = serde_json::from_slice::<ApiErrorBody>(&response.body)
        .ok()
        .and_then(|b| b.code);
    if let Some(err) = code.as_deref().and_then(error_from_code) {
        return Err(err);
    }

    Err(match response.status {
        404 => FriendRequestError::NotFound,
        409 => FriendRequestError::AlreadyFriends,
        502..=504 => FriendRequestError::NetworkError,
        _ => FriendRequestError::Unknown,
    })
}

pub fn decode_existing_friends(response: &RawResponse) -> Result<Vec<ExistingUser>, AcquisitionError> {
    if !is_success(response.status) {
        return Err(AcquisitionError::DirectoryUnavailable(format!(
            "status {}: {}",
            response.status,
            error_message(&response.body)
        )));
    }
    serde_json::from_slice::<Vec<ExistingUser>>(&response.body)
        .map_err(|e| AcquisitionError::SerializationError(format!("existing friends: {}", e)))
}

pub fn map_tree_response(response: &RawResponse) -> Result<(), AcquisitionError> {
    if is_success(response.status) {
        Ok(())
    } else {
        Err(AcquisitionError::TreeMutationFailed(format!(
            "status {}: {}",
            response.status,
            error_message(&response.body)
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, body: &str) -> RawResponse {
        RawResponse {
            status,
            body: body.as_bytes().to_vec(),
        }
    }

    #[test]
    fn success_exposes_confirmation_message() {
        let ack = map_friend_request_response(&response(201, r#"{"message":"Request sent"}"#));
        assert_eq!(
            ack,
            Ok(FriendRequestAck {
                message: "Request sent".to_string()
            })
        );
    }

    #[test]
    fn success_without_message_is_unknown() {
        assert_eq!(
            map_friend_request_response(&response(200, "ok")),
            Err(FriendRequestError::Unknown)
        );
    }

    #[test]
    fn statuses_map_to_taxonomy() {
        assert_eq!(
            map_friend_request_response(&response(404, "")),
            Err(FriendRequestError::NotFound)
        );
        assert_eq!(
            map_friend_request_response(&response(409, "{}")),
            Err(FriendRequestError::AlreadyFriends)
        );
        assert_eq!(
            map_friend_request_response(&response(503, "")),
            Err(FriendRequestError::NetworkError)
        );
        assert_eq!(
            map_friend_request_response(&response(500, "boom")),
            Err(FriendRequestError::Unknown)
        );
    }

    #[test]
    fn body_code_wins_over_status() {
        assert_eq!(
            map_friend_request_response(&response(
                409,
                r#"{"error":"pending","code":"ALREADY_PENDING"}"#
            )),
            Err(FriendRequestError::AlreadyPending)
        );
        assert_eq!(
            map_friend_request_response(&response(
                400,
                r#"{"error":"cannot add yourself","code":"SELF_REQUEST"}"#
            )),
            Err(FriendRequestError::SelfRequest)
        );
    }

    #[test]
    fn request_body_uses_camel_case_user_id() {
        let body = serde_json::to_string(&FriendRequestBody {
            user_id: UserId::from("User123"),
        })
        .unwrap();
        assert_eq!(body, r#"{"userId":"user123"}"#);
    }

    #[test]
    fn friends_decode_normalizes_user_ids() {
        let friends = decode_existing_friends(&response(
            200,
            r#"[{"id":"1","userId":"Cousin_Vinny","firstName":"Vincent","lastName":"Gambini","email":"v@example.com"},
                {"id":"2","firstName":"Mona","lastName":"Lisa","email":"mona@example.com","photoUrl":null}]"#,
        ))
        .unwrap();
        assert_eq!(friends.len(), 2);
        assert_eq!(friends[0].user_id, Some(UserId::from("cousinvinny")));
        assert_eq!(friends[1].user_id, None);
    }

    #[test]
    fn directory_failure_is_reported() {
        assert!(matches!(
            decode_existing_friends(&response(500, r#"{"error":"db down"}"#)),
            Err(AcquisitionError::DirectoryUnavailable(msg)) if msg.contains("db down")
        ));
    }

    #[test]
    fn tree_failure_is_opaque_message() {
        assert_eq!(map_tree_response(&response(204, "")), Ok(()));
        assert!(matches!(
            map_tree_response(&response(422, r#"{"error":"duplicate"}"#)),
            Err(AcquisitionError::TreeMutationFailed(_))
        ));
    }

    fn header<'a>(request: &'a CanisterHttpRequestArgument, name: &str) -> Option<&'a str> {
        request
            .headers
            .iter()
            .find(|h| h.name == name)
            .map(|h| h.value.as_str())
    }

    #[test]
    fn urls_join_base_and_path() {
        let client = FamilyApiClient::new(&ServiceConfig::default());
        let request = client.build_request(HttpMethod::GET, EXISTING_FRIENDS_PATH, None, None);
        assert_eq!(request.url, "https://family.example.com/api/family/friends");
        assert_eq!(request.headers.len(), 1);
        assert_eq!(header(&request, "Idempotency-Key"), None);
    }

    #[test]
    fn posts_carry_idempotency_key() {
        let client = FamilyApiClient::new(&ServiceConfig::default());
        let owner = candid::Principal::from_slice(&[4; 29]);
        let key = IdempotencyKey::new(&owner, 2, 5, 1);
        let request = client.build_request(
            HttpMethod::POST,
            FRIEND_REQUESTS_PATH,
            Some(vec![]),
            Some(&key),
        );
        assert_eq!(
            request.url,
            "https://family.example.com/api/family/friend-requests"
        );
        assert_eq!(header(&request, "Content-Type"), Some("application/json"));
        assert_eq!(header(&request, "Idempotency-Key"), Some(key.as_str()));
    }

    #[test]
    fn transform_keeps_status_and_body_only() {
        let transformed = strip_response_headers(TransformArgs {
            response: HttpResponse {
                status: Nat::from(201u64),
                headers: vec![HttpHeader {
                    name: "Date".to_string(),
                    value: "Mon, 19 Oct 2026 10:00:00 GMT".to_string(),
                }],
                body: br#"{"message":"sent"}"#.to_vec(),
            },
            context: vec![],
        });
        assert!(transformed.headers.is_empty());
        assert_eq!(status_code(&transformed.status), 201);
        assert_eq!(transformed.body, br#"{"message":"sent"}"#.to_vec());
    }
}
