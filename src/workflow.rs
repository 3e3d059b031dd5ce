//! Fire-and-forget notification to the workflow-automation endpoint.
//!
//! The automation flow owns the forwarding rule's lifecycle: it receives the
//! window and the rule id here, then enables the rule at the window start and
//! disables it at the end. Only the success or failure of the POST is
//! consumed; no response payload.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Serialize;
use tracing::info;
use url::Url;

use crate::error::RemoteError;

/// Payload posted to the automation endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowNotice {
    pub user_id: String,
    pub user_display_name: String,
    pub start_date_time: DateTime<Utc>,
    pub end_date_time: DateTime<Utc>,
    /// Absent when no forwarding rule was created.
    pub rule_id: Option<String>,
    pub forward_to_email: Option<String>,
    pub forward_to_name: Option<String>,
}

#[async_trait]
pub trait WorkflowNotifier: Send + Sync {
    async fn notify(&self, notice: &WorkflowNotice) -> Result<(), RemoteError>;
}

/// POSTs the notice as JSON to a single configured endpoint.
pub struct HttpWorkflowNotifier {
    http: Client,
    endpoint: Url,
}

impl HttpWorkflowNotifier {
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, RemoteError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| RemoteError::Transport {
                endpoint: endpoint.to_string(),
                source,
            })?;
        Ok(Self { http, endpoint })
    }
}

#[async_trait]
impl WorkflowNotifier for HttpWorkflowNotifier {
    async fn notify(&self, notice: &WorkflowNotice) -> Result<(), RemoteError> {
        let endpoint = self.endpoint.to_string();
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(notice)
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

        info!(user = %notice.user_id, "workflow automation notified");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn notice_serializes_camel_case_with_nullable_rule() {
        let notice = WorkflowNotice {
            user_id: "u1".into(),
            user_display_name: "Dana Example".into(),
            start_date_time: Utc.with_ymd_and_hms(2026, 8, 10, 9, 0, 0).unwrap(),
            end_date_time: Utc.with_ymd_and_hms(2026, 8, 24, 17, 0, 0).unwrap(),
            rule_id: None,
            forward_to_email: None,
            forward_to_name: None,
        };
        let json = serde_json::to_value(&notice).expect("serialize");
        assert_eq!(json["userId"], "u1");
        assert_eq!(json["userDisplayName"], "Dana Example");
        assert!(json["startDateTime"].as_str().unwrap().starts_with("2026-08-10T09:00:00"));
        assert!(json["ruleId"].is_null());
        assert!(json["forwardToEmail"].is_null());
    }
}
