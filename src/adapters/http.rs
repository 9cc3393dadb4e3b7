use crate::domain::model::{AssetCandidate, GroupRecord};
use crate::domain::ports::{AssetApi, ConfigProvider};
use crate::utils::error::{Result, SyncError};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{json, Value};

/// reqwest-backed implementation of [`AssetApi`].
///
/// List endpoints return `{"entities": [...]}`, single-entity endpoints
/// return `{"entity": {...}}`. Everything is parsed into typed records here;
/// a response missing a required field is an `UnexpectedResponse`, never a
/// shape the core has to tolerate.
pub struct HttpAssetApi {
    client: Client,
    base_url: String,
    token: Option<String>,
    member_search_limit: usize,
}

#[derive(Deserialize)]
struct EntityListResponse {
    #[serde(default)]
    entities: Vec<Value>,
}

#[derive(Deserialize)]
struct EntityResponse {
    entity: Value,
}

impl HttpAssetApi {
    pub fn new(base_url: &str, token: Option<String>, member_search_limit: usize) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            member_search_limit,
        }
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Self {
        Self::new(
            config.api_base_url(),
            config.api_token().map(str::to_string),
            config.member_search_limit(),
        )
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let builder = self.client.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn check_status(operation: &str, response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(SyncError::unexpected_response(
                operation,
                format!("HTTP {}: {}", status, body),
            ))
        }
    }
}

fn entity_id(operation: &str, value: &Value) -> Result<String> {
    match value.get("id") {
        Some(Value::String(id)) if !id.is_empty() => Ok(id.clone()),
        Some(Value::Number(id)) => Ok(id.to_string()),
        _ => Err(SyncError::unexpected_response(
            operation,
            format!("entity has no usable id: {}", value),
        )),
    }
}

fn parse_group(operation: &str, value: &Value) -> Result<GroupRecord> {
    Ok(GroupRecord {
        id: entity_id(operation, value)?,
        name: value
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
    })
}

fn parse_asset(operation: &str, value: &Value) -> Result<AssetCandidate> {
    Ok(AssetCandidate {
        id: entity_id(operation, value)?,
        name: value
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_string),
        // A missing or non-string fqdn makes the candidate unmatchable
        // rather than failing the lookup.
        fqdn: value
            .get("fqdn")
            .and_then(Value::as_str)
            .map(str::to_string),
    })
}

#[async_trait]
impl AssetApi for HttpAssetApi {
    async fn find_group_by_name(&self, name: &str) -> Result<Option<GroupRecord>> {
        tracing::debug!(name, "GET /custom-groups");
        let response = self
            .request(Method::GET, "/custom-groups")
            .query(&[("name", name), ("limit", "1")])
            .send()
            .await?;

        let response = Self::check_status("group-lookup", response).await?;
        let body: EntityListResponse = response.json().await?;

        body.entities
            .first()
            .map(|entity| parse_group("group-lookup", entity))
            .transpose()
    }

    async fn create_group(&self, name: &str, description: &str) -> Result<String> {
        tracing::debug!(name, "POST /custom-groups");
        let response = self
            .request(Method::POST, "/custom-groups")
            .json(&json!({
                "name": name,
                "description": description,
                "membersId": [],
            }))
            .send()
            .await?;

        let response = Self::check_status("group-create", response).await?;
        let body: EntityResponse = response.json().await.map_err(|_| {
            SyncError::unexpected_response("group-create", "response carried no entity")
        })?;

        entity_id("group-create", &body.entity)
    }

    async fn fetch_group(&self, id: &str) -> Result<GroupRecord> {
        tracing::debug!(id, "GET /custom-groups/{{id}}");
        let response = self
            .request(Method::GET, &format!("/custom-groups/{}", id))
            .send()
            .await?;

        let response = Self::check_status("group-fetch", response).await?;
        let body: EntityResponse = response.json().await.map_err(|_| {
            SyncError::unexpected_response("group-fetch", "response carried no entity")
        })?;

        parse_group("group-fetch", &body.entity)
    }

    async fn search_assets(&self, name: &str) -> Result<Vec<AssetCandidate>> {
        tracing::debug!(name, "GET /assets");
        let limit = self.member_search_limit.to_string();
        let response = self
            .request(Method::GET, "/assets")
            .query(&[("name", name), ("limit", &limit), ("active", "true")])
            .send()
            .await?;

        let response = Self::check_status("asset-search", response).await?;
        let body: EntityListResponse = response.json().await?;

        body.entities
            .iter()
            .map(|entity| parse_asset("asset-search", entity))
            .collect()
    }

    async fn replace_members(&self, group_id: &str, member_ids: &[String]) -> Result<()> {
        tracing::debug!(
            group_id,
            members = member_ids.len(),
            "PUT /custom-groups/{{id}}/members"
        );
        let response = self
            .request(Method::PUT, &format!("/custom-groups/{}/members", group_id))
            .json(&json!({ "membersId": member_ids }))
            .send()
            .await?;

        Self::check_status("membership-replace", response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn api(server: &MockServer) -> HttpAssetApi {
        HttpAssetApi::new(&server.base_url(), Some("secret-token".to_string()), 10)
    }

    #[tokio::test]
    async fn test_find_group_hit() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/custom-groups")
                .query_param("name", "APP1")
                .query_param("limit", "1")
                .header("authorization", "Bearer secret-token");
            then.status(200).json_body(serde_json::json!({
                "entities": [{"id": "g-1", "name": "APP1"}]
            }));
        });

        let result = api(&server).find_group_by_name("APP1").await.unwrap();

        mock.assert();
        let group = result.unwrap();
        assert_eq!(group.id, "g-1");
        assert_eq!(group.name, "APP1");
    }

    #[tokio::test]
    async fn test_find_group_miss() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/custom-groups");
            then.status(200).json_body(serde_json::json!({"entities": []}));
        });

        let result = api(&server).find_group_by_name("APP1").await.unwrap();

        mock.assert();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_create_group_returns_entity_id() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/custom-groups")
                .json_body(serde_json::json!({
                    "name": "APP1",
                    "description": "test group",
                    "membersId": []
                }));
            then.status(201)
                .json_body(serde_json::json!({"entity": {"id": "g-new"}}));
        });

        let id = api(&server)
            .create_group("APP1", "test group")
            .await
            .unwrap();

        mock.assert();
        assert_eq!(id, "g-new");
    }

    #[tokio::test]
    async fn test_create_group_without_id_is_an_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/custom-groups");
            then.status(201)
                .json_body(serde_json::json!({"entity": {"name": "APP1"}}));
        });

        let err = api(&server)
            .create_group("APP1", "test group")
            .await
            .unwrap_err();

        assert!(matches!(err, SyncError::UnexpectedResponse { .. }));
    }

    #[tokio::test]
    async fn test_search_assets_parses_candidates() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/assets")
                .query_param("name", "host1")
                .query_param("limit", "10")
                .query_param("active", "true");
            then.status(200).json_body(serde_json::json!({
                "entities": [
                    {"id": "a-1", "name": "host1", "fqdn": "host1.corp.com"},
                    {"id": "a-2", "name": "host1", "fqdn": 17},
                    {"id": "a-3", "name": "host1"}
                ]
            }));
        });

        let candidates = api(&server).search_assets("host1").await.unwrap();

        mock.assert();
        assert_eq!(candidates.len(), 3);
        assert_eq!(candidates[0].fqdn.as_deref(), Some("host1.corp.com"));
        // Non-string and absent fqdn fields both come back as None.
        assert!(candidates[1].fqdn.is_none());
        assert!(candidates[2].fqdn.is_none());
    }

    #[tokio::test]
    async fn test_replace_members_puts_full_set() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(PUT)
                .path("/custom-groups/g-1/members")
                .json_body(serde_json::json!({"membersId": ["a-1", "a-2"]}));
            then.status(200);
        });

        api(&server)
            .replace_members("g-1", &["a-1".to_string(), "a-2".to_string()])
            .await
            .unwrap();

        mock.assert();
    }

    #[tokio::test]
    async fn test_error_status_carries_body_for_diagnosis() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(PUT).path("/custom-groups/g-1/members");
            then.status(403).body("forbidden: token expired");
        });

        let err = api(&server)
            .replace_members("g-1", &["a-1".to_string()])
            .await
            .unwrap_err();

        let message = err.to_string();
        assert!(message.contains("membership-replace"));
        assert!(message.contains("403"));
        assert!(message.contains("token expired"));
    }
}
