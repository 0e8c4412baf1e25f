pub mod policy;

use crate::domain::model::{CfList, CfPolicy};
use crate::utils::error::{Result, SyncError};
use reqwest::{Client, Method};
use serde_json::json;

pub const DEFAULT_API_URL: &str = "https://api.cloudflare.com/client/v4";

/// Account credentials, always sourced from the environment rather than the
/// config file.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub api_token: String,
    pub account_id: String,
}

impl Credentials {
    pub fn from_env() -> Result<Self> {
        let api_token = std::env::var("CF_API_TOKEN").unwrap_or_default();
        let account_id = std::env::var("CF_IDENTIFIER").unwrap_or_default();

        if api_token.is_empty() {
            return Err(SyncError::MissingConfigError {
                field: "CF_API_TOKEN".to_string(),
            });
        }
        if account_id.is_empty() {
            return Err(SyncError::MissingConfigError {
                field: "CF_IDENTIFIER".to_string(),
            });
        }

        Ok(Self {
            api_token,
            account_id,
        })
    }
}

/// Thin client over the Zero Trust Gateway endpoints this tool touches:
/// `lists` and `rules` under `/accounts/{id}/gateway`.
pub struct GatewayClient {
    client: Client,
    base_url: String,
    api_token: String,
}

impl GatewayClient {
    pub fn new(api_url: &str, credentials: &Credentials) -> Self {
        Self {
            client: Client::new(),
            base_url: format!(
                "{}/accounts/{}/gateway",
                api_url.trim_end_matches('/'),
                credentials.account_id
            ),
            api_token: credentials.api_token.clone(),
        }
    }

    async fn api_call(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<serde_json::Value>,
    ) -> Result<serde_json::Value> {
        let url = format!("{}/{}", self.base_url, endpoint);

        let mut request = self
            .client
            .request(method, &url)
            .bearer_auth(&self.api_token);

        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();

        tracing::debug!("[{}] {}", endpoint, status);

        if !status.is_success() {
            return Err(SyncError::GatewayError {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }

        let envelope: serde_json::Value = response.json().await?;
        Ok(envelope
            .get("result")
            .cloned()
            .unwrap_or(serde_json::Value::Null))
    }

    /// Returns the lists matching `name_prefix` and the full set, in that order.
    pub async fn get_lists(&self, name_prefix: &str) -> Result<(Vec<CfList>, Vec<CfList>)> {
        let result = self.api_call(Method::GET, "lists", None).await?;

        let all: Vec<CfList> = match result {
            serde_json::Value::Null => Vec::new(),
            other => serde_json::from_value(other)?,
        };
        let prefixed = all
            .iter()
            .filter(|l| l.name.starts_with(name_prefix))
            .cloned()
            .collect();

        Ok((prefixed, all))
    }

    pub async fn create_list(&self, name: &str, domains: &[String]) -> Result<CfList> {
        let result = self
            .api_call(
                Method::POST,
                "lists",
                Some(json!({
                    "name": name,
                    "description": "Created by script.",
                    "type": "DOMAIN",
                    "items": domains.iter().map(|d| json!({"value": d})).collect::<Vec<_>>(),
                })),
            )
            .await?;

        tracing::debug!("Created list {}", name);
        Ok(serde_json::from_value(result)?)
    }

    pub async fn delete_list(&self, list_id: &str, name: &str) -> Result<()> {
        self.api_call(Method::DELETE, &format!("lists/{}", list_id), None)
            .await?;
        tracing::debug!("Deleted list {}", name);
        Ok(())
    }

    pub async fn get_policies(&self, name_prefix: &str) -> Result<Vec<CfPolicy>> {
        let result = self.api_call(Method::GET, "rules", None).await?;

        let all: Vec<CfPolicy> = match result {
            serde_json::Value::Null => Vec::new(),
            other => serde_json::from_value(other)?,
        };

        Ok(all
            .into_iter()
            .filter(|p| p.name.starts_with(name_prefix))
            .collect())
    }

    pub async fn create_policy(
        &self,
        name: &str,
        traffic: &str,
        block_page_enabled: bool,
    ) -> Result<CfPolicy> {
        let result = self
            .api_call(
                Method::POST,
                "rules",
                Some(json!({
                    "name": name,
                    "description": "Created by script.",
                    "action": "block",
                    "enabled": true,
                    "filters": ["dns"],
                    "traffic": traffic,
                    "rule_settings": {"block_page_enabled": block_page_enabled},
                })),
            )
            .await?;

        tracing::info!("Created firewall policy: {}", name);
        Ok(serde_json::from_value(result)?)
    }

    pub async fn delete_policy(&self, policy_id: &str, name: &str) -> Result<()> {
        self.api_call(Method::DELETE, &format!("rules/{}", policy_id), None)
            .await?;
        tracing::info!("Deleted policy {}", name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn test_client(server: &MockServer) -> GatewayClient {
        let credentials = Credentials {
            api_token: "test-token".to_string(),
            account_id: "test-account".to_string(),
        };
        GatewayClient::new(&server.base_url(), &credentials)
    }

    #[tokio::test]
    async fn test_get_lists_filters_by_prefix() {
        let server = MockServer::start();
        let lists_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/accounts/test-account/gateway/lists")
                .header("Authorization", "Bearer test-token");
            then.status(200).json_body(serde_json::json!({
                "result": [
                    {"id": "a", "name": "[CFPihole] Block Ads 1", "count": 1000},
                    {"id": "b", "name": "[CFPihole] Block Ads 2", "count": 250},
                    {"id": "c", "name": "Unrelated list", "count": 7}
                ]
            }));
        });

        let client = test_client(&server);
        let (prefixed, all) = client.get_lists("[CFPihole] Block Ads").await.unwrap();

        lists_mock.assert();
        assert_eq!(prefixed.len(), 2);
        assert_eq!(all.len(), 3);
        assert_eq!(prefixed[0].count, 1000);
    }

    #[tokio::test]
    async fn test_get_lists_handles_null_result() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/accounts/test-account/gateway/lists");
            then.status(200).json_body(serde_json::json!({"result": null}));
        });

        let client = test_client(&server);
        let (prefixed, all) = client.get_lists("[CFPihole]").await.unwrap();

        assert!(prefixed.is_empty());
        assert!(all.is_empty());
    }

    #[tokio::test]
    async fn test_create_list_sends_domain_items() {
        let server = MockServer::start();
        let create_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/accounts/test-account/gateway/lists")
                .json_body_partial(
                    r#"{
                        "name": "[CFPihole] Block Ads 1",
                        "type": "DOMAIN",
                        "items": [{"value": "ads.example.com"}]
                    }"#,
                );
            then.status(200).json_body(serde_json::json!({
                "result": {"id": "new-id", "name": "[CFPihole] Block Ads 1", "count": 1}
            }));
        });

        let client = test_client(&server);
        let list = client
            .create_list("[CFPihole] Block Ads 1", &["ads.example.com".to_string()])
            .await
            .unwrap();

        create_mock.assert();
        assert_eq!(list.id, "new-id");
    }

    #[tokio::test]
    async fn test_rate_limit_surfaces_as_gateway_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/accounts/test-account/gateway/lists");
            then.status(429);
        });

        let client = test_client(&server);
        let err = client.create_list("x", &[]).await.unwrap_err();

        match err {
            SyncError::GatewayError { status, .. } => assert_eq!(status, 429),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_delete_policy() {
        let server = MockServer::start();
        let delete_mock = server.mock(|when, then| {
            when.method(DELETE)
                .path("/accounts/test-account/gateway/rules/policy-1");
            then.status(200).json_body(serde_json::json!({"result": null}));
        });

        let client = test_client(&server);
        client
            .delete_policy("policy-1", "[CFPihole] Block Ads")
            .await
            .unwrap();

        delete_mock.assert();
    }

    #[tokio::test]
    async fn test_credentials_from_env_requires_both() {
        std::env::remove_var("CF_API_TOKEN");
        std::env::remove_var("CF_IDENTIFIER");
        assert!(Credentials::from_env().is_err());

        std::env::set_var("CF_API_TOKEN", "t");
        assert!(Credentials::from_env().is_err());

        std::env::set_var("CF_IDENTIFIER", "i");
        let credentials = Credentials::from_env().unwrap();
        assert_eq!(credentials.api_token, "t");
        assert_eq!(credentials.account_id, "i");

        std::env::remove_var("CF_API_TOKEN");
        std::env::remove_var("CF_IDENTIFIER");
    }
}
