//! Typed reqwest wrapper for the Admin Directory API.
//!
//! One HTTP call per operation; failures other than an authorization
//! rejection propagate as-is with no retry or backoff.

use reqwest::StatusCode;
use tracing::debug;

use dirgate_core::error::{DirgateError, Result};

use crate::models::{GroupMember, GroupMemberList, UserRecord};

const ADMIN_API_BASE: &str = "https://admin.googleapis.com";

/// HTTP client for Directory API operations.
#[derive(Debug)]
pub struct DirectoryClient {
    http: reqwest::Client,
    base_url: String,
    auth_token: String,
}

impl DirectoryClient {
    /// Create a new client with the given bearer token.
    pub fn new(auth_token: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: ADMIN_API_BASE.to_string(),
            auth_token: auth_token.to_string(),
        }
    }

    /// Override the base URL (for testing with wiremock).
    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    fn user_url(&self, email: &str) -> String {
        format!("{}/admin/directory/v1/users/{}", self.base_url, email)
    }

    fn members_url(&self, group_key: &str) -> String {
        format!(
            "{}/admin/directory/v1/groups/{}/members",
            self.base_url, group_key
        )
    }

    /// Fetch a user's directory record as the raw JSON mapping.
    pub async fn get_user(&self, email: &str) -> Result<UserRecord> {
        debug!(%email, "getting directory record");
        let resp = self
            .http
            .get(self.user_url(email))
            .bearer_auth(&self.auth_token)
            .send()
            .await
            .map_err(|e| DirgateError::Directory(format!("get user request failed: {e}")))?;

        if resp.status() == StatusCode::UNAUTHORIZED {
            let body = resp.text().await.unwrap_or_default();
            return Err(DirgateError::TokenRefresh(format!(
                "get user rejected: {body}"
            )));
        }

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(DirgateError::Directory(format!(
                "get user failed ({status}): {body}"
            )));
        }

        resp.json::<UserRecord>()
            .await
            .map_err(|e| DirgateError::Directory(format!("get user parse failed: {e}")))
    }

    /// Replace a user's directory record. The response body is discarded.
    pub async fn update_user(&self, email: &str, record: &UserRecord) -> Result<()> {
        debug!(%email, "updating directory record");
        let resp = self
            .http
            .put(self.user_url(email))
            .bearer_auth(&self.auth_token)
            .json(record)
            .send()
            .await
            .map_err(|e| DirgateError::Directory(format!("update user request failed: {e}")))?;

        if resp.status() == StatusCode::UNAUTHORIZED {
            let body = resp.text().await.unwrap_or_default();
            return Err(DirgateError::TokenRefresh(format!(
                "update user rejected: {body}"
            )));
        }

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(DirgateError::Directory(format!(
                "update user failed ({status}): {body}"
            )));
        }

        Ok(())
    }

    /// List the members of a group. A group with no members yields an
    /// empty vec; member order follows the response.
    pub async fn list_group_members(&self, group_key: &str) -> Result<Vec<GroupMember>> {
        debug!(%group_key, "listing group members");
        let resp = self
            .http
            .get(self.members_url(group_key))
            .bearer_auth(&self.auth_token)
            .send()
            .await
            .map_err(|e| DirgateError::Directory(format!("list members request failed: {e}")))?;

        if resp.status() == StatusCode::UNAUTHORIZED {
            let body = resp.text().await.unwrap_or_default();
            return Err(DirgateError::TokenRefresh(format!(
                "list members rejected: {body}"
            )));
        }

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(DirgateError::Directory(format!(
                "list members failed ({status}): {body}"
            )));
        }

        let list = resp
            .json::<GroupMemberList>()
            .await
            .map_err(|e| DirgateError::Directory(format!("list members parse failed: {e}")))?;
        Ok(list.members.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{bearer_token, body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn setup() -> (MockServer, DirectoryClient) {
        let server = MockServer::start().await;
        let client = DirectoryClient::new("test-token").with_base_url(&server.uri());
        (server, client)
    }

    #[tokio::test]
    async fn get_user_returns_raw_record() {
        let (server, client) = setup().await;

        let response_body = serde_json::json!({
            "primaryEmail": "jdoe@example.com",
            "isAdmin": false,
            "orgUnitPath": "/Staff"
        });

        Mock::given(method("GET"))
            .and(path("/admin/directory/v1/users/jdoe@example.com"))
            .and(bearer_token("test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&response_body))
            .mount(&server)
            .await;

        let record = client.get_user("jdoe@example.com").await.unwrap();
        assert_eq!(record["primaryEmail"], "jdoe@example.com");
        assert_eq!(record["isAdmin"], serde_json::Value::Bool(false));
    }

    #[tokio::test]
    async fn get_user_unauthorized_is_token_refresh() {
        let (server, client) = setup().await;

        Mock::given(method("GET"))
            .and(path("/admin/directory/v1/users/jdoe@example.com"))
            .respond_with(
                ResponseTemplate::new(401).set_body_string(r#"{"error": "invalid_grant"}"#),
            )
            .mount(&server)
            .await;

        let err = client.get_user("jdoe@example.com").await.unwrap_err();
        assert!(matches!(err, DirgateError::TokenRefresh(_)));
    }

    #[tokio::test]
    async fn get_user_server_error_propagates() {
        let (server, client) = setup().await;

        Mock::given(method("GET"))
            .and(path("/admin/directory/v1/users/jdoe@example.com"))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
            .mount(&server)
            .await;

        let err = client.get_user("jdoe@example.com").await.unwrap_err();
        assert!(matches!(err, DirgateError::Directory(_)));
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn update_user_sends_record() {
        let (server, client) = setup().await;

        let record: UserRecord = serde_json::from_value(serde_json::json!({
            "primaryEmail": "jdoe@example.com",
            "suspended": true
        }))
        .unwrap();

        Mock::given(method("PUT"))
            .and(path("/admin/directory/v1/users/jdoe@example.com"))
            .and(bearer_token("test-token"))
            .and(body_json(&record))
            .respond_with(ResponseTemplate::new(200).set_body_json(&record))
            .expect(1)
            .mount(&server)
            .await;

        client.update_user("jdoe@example.com", &record).await.unwrap();
    }

    #[tokio::test]
    async fn update_user_failure_propagates() {
        let (server, client) = setup().await;

        Mock::given(method("PUT"))
            .and(path("/admin/directory/v1/users/jdoe@example.com"))
            .respond_with(ResponseTemplate::new(403).set_body_string("quota exceeded"))
            .mount(&server)
            .await;

        let record = UserRecord::new();
        let err = client
            .update_user("jdoe@example.com", &record)
            .await
            .unwrap_err();
        assert!(matches!(err, DirgateError::Directory(_)));
        assert!(err.to_string().contains("403"));
    }

    #[tokio::test]
    async fn list_group_members_preserves_order() {
        let (server, client) = setup().await;

        let response_body = serde_json::json!({
            "members": [
                {"email": "b@example.com", "role": "OWNER"},
                {"email": "a@example.com", "role": "MEMBER"}
            ]
        });

        Mock::given(method("GET"))
            .and(path("/admin/directory/v1/groups/admins@example.com/members"))
            .and(bearer_token("test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&response_body))
            .mount(&server)
            .await;

        let members = client
            .list_group_members("admins@example.com")
            .await
            .unwrap();
        assert_eq!(members.len(), 2);
        assert_eq!(members[0].email, "b@example.com");
        assert_eq!(members[1].email, "a@example.com");
    }

    #[tokio::test]
    async fn list_group_members_empty_group() {
        let (server, client) = setup().await;

        Mock::given(method("GET"))
            .and(path("/admin/directory/v1/groups/admins@example.com/members"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let members = client
            .list_group_members("admins@example.com")
            .await
            .unwrap();
        assert!(members.is_empty());
    }

    #[tokio::test]
    async fn list_group_members_unauthorized_is_token_refresh() {
        let (server, client) = setup().await;

        Mock::given(method("GET"))
            .and(path("/admin/directory/v1/groups/admins@example.com/members"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = client
            .list_group_members("admins@example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, DirgateError::TokenRefresh(_)));
    }
}
