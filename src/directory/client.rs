//! HTTP client for the directory people search.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use super::types::{DirectoryRecord, UserListResponse};
use super::DirectoryLookup;
use crate::auth::{TokenProvider, SCOPE_USER_READ};
use crate::error::RemoteError;

/// Fields requested for each matched user.
const SELECT_FIELDS: &str = "id,displayName,mail,userPrincipalName,jobTitle,department";

/// Directory search client.
///
/// Free-text `$search` queries run against an eventually-consistent index:
/// the `ConsistencyLevel: eventual` header (and the `$count` directive it
/// requires) must accompany every search request; omitting it yields empty
/// results even when matches exist.
pub struct GraphDirectoryClient {
    http: Client,
    base_url: Url,
    tokens: Arc<dyn TokenProvider>,
}

impl GraphDirectoryClient {
    pub fn new(
        base_url: Url,
        tokens: Arc<dyn TokenProvider>,
        timeout: Duration,
    ) -> Result<Self, RemoteError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| RemoteError::Transport {
                endpoint: base_url.to_string(),
                source,
            })?;
        Ok(Self {
            http,
            base_url,
            tokens,
        })
    }

    fn search_url(&self, query: &str, limit: usize) -> Result<Url, RemoteError> {
        let mut url = self
            .base_url
            .join("users")
            .map_err(|_| RemoteError::Status {
                endpoint: self.base_url.to_string(),
                status: reqwest::StatusCode::BAD_REQUEST,
                body: "invalid directory base URL".into(),
            })?;
        // Quotes inside $search are part of the directory query syntax; the
        // serializer percent-encodes the rest.
        let escaped = query.replace('"', "");
        url.query_pairs_mut()
            .append_pair(
                "$search",
                &format!("\"displayName:{escaped}\" OR \"mail:{escaped}\""),
            )
            .append_pair(
                "$filter",
                "accountEnabled eq true and userType eq 'Member'",
            )
            .append_pair("$select", SELECT_FIELDS)
            .append_pair("$count", "true")
            .append_pair("$top", &limit.to_string());
        Ok(url)
    }
}

#[async_trait]
impl DirectoryLookup for GraphDirectoryClient {
    async fn search_people(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<DirectoryRecord>, RemoteError> {
        let token = self.tokens.acquire_token(&[SCOPE_USER_READ]).await?;
        let url = self.search_url(query, limit)?;
        let endpoint = format!("{}/users", self.base_url);

        let response = self
            .http
            .get(url)
            .bearer_auth(token.secret())
            .header("ConsistencyLevel", "eventual")
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|source| RemoteError::Transport {
                endpoint: endpoint.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::Status {
                endpoint,
                status,
                body: body.chars().take(200).collect(),
            });
        }

        let list: UserListResponse =
            response
                .json()
                .await
                .map_err(|source| RemoteError::Decode { endpoint, source })?;

        // Service order, capped, never re-sorted client-side.
        let mut records = list.value;
        records.truncate(limit);
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticTokenProvider;

    fn client() -> GraphDirectoryClient {
        GraphDirectoryClient::new(
            Url::parse("https://graph.example.com/v1.0/").expect("url"),
            Arc::new(StaticTokenProvider::new("t".into())),
            Duration::from_secs(30),
        )
        .expect("client")
    }

    #[test]
    fn search_url_carries_search_filter_and_cap() {
        let url = client().search_url("john", 10).expect("url");
        let rendered = url.as_str();
        assert!(rendered.contains("%24search="));
        assert!(rendered.contains("displayName%3Ajohn"));
        assert!(rendered.contains("mail%3Ajohn"));
        assert!(rendered.contains("%24top=10"));
        assert!(rendered.contains("%24count=true"));
        assert!(rendered.contains("userType+eq+%27Member%27"));
    }

    #[test]
    fn embedded_quotes_cannot_break_the_search_clause() {
        let url = client().search_url("jo\"hn", 10).expect("url");
        assert!(!url.as_str().contains("jo%22hn"));
    }
}
