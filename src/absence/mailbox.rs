//! Mailbox and calendar mutations behind the [`MailboxApi`] seam.
//!
//! The pipeline depends on this trait only; [`GraphMailboxClient`] is the
//! production implementation against the directory/mailbox HTTP API. Each
//! method is one independent remote call; the pipeline, not this layer,
//! decides what a partial failure means.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use url::Url;

use super::request::AbsenceWindow;
use crate::auth::{TokenProvider, SCOPE_CALENDARS, SCOPE_MAILBOX_SETTINGS};
use crate::directory::DirectoryRecord;
use crate::error::RemoteError;

/// Page size when listing meetings inside the absence window.
const CALENDAR_PAGE_SIZE: usize = 50;

/// A meeting occupying the absence window.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingRef {
    pub id: String,
    #[serde(default)]
    pub subject: String,
    /// Meetings the member organizes cannot be declined, only cancelled;
    /// the pipeline leaves them alone.
    #[serde(default)]
    pub is_organizer: bool,
}

/// Mailbox/calendar operations the submission pipeline performs.
#[async_trait]
pub trait MailboxApi: Send + Sync {
    /// Schedule the auto-reply for the window with both messages.
    async fn set_automatic_replies(
        &self,
        user_id: &str,
        window: &AbsenceWindow,
        internal_message: &str,
        external_message: &str,
    ) -> Result<(), RemoteError>;

    /// Create the forwarding rule **disabled** and return its rule id. The
    /// workflow endpoint enables it at the window start and disables it at
    /// the end.
    async fn create_forwarding_rule(
        &self,
        user_id: &str,
        target: &DirectoryRecord,
    ) -> Result<String, RemoteError>;

    /// Block the window in the member's calendar; returns the event id.
    async fn create_calendar_block(
        &self,
        user_id: &str,
        window: &AbsenceWindow,
        subject: &str,
    ) -> Result<String, RemoteError>;

    /// Create the inbox rule that disposes of new meeting requests; returns
    /// the rule id.
    async fn create_decline_rule(&self, user_id: &str) -> Result<String, RemoteError>;

    /// Meetings scheduled inside the window.
    async fn list_meetings(
        &self,
        user_id: &str,
        window: &AbsenceWindow,
    ) -> Result<Vec<MeetingRef>, RemoteError>;

    /// Decline one meeting with a comment, notifying the organizer.
    async fn decline_meeting(
        &self,
        user_id: &str,
        event_id: &str,
        comment: &str,
    ) -> Result<(), RemoteError>;
}

#[derive(Debug, Deserialize)]
struct CreatedResource {
    id: String,
}

#[derive(Debug, Deserialize)]
struct MeetingListResponse {
    value: Vec<MeetingRef>,
}

/// Production mailbox client.
pub struct GraphMailboxClient {
    http: Client,
    base_url: Url,
    tokens: Arc<dyn TokenProvider>,
}

impl GraphMailboxClient {
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

    fn endpoint(&self, path: &str) -> Result<Url, RemoteError> {
        self.base_url.join(path).map_err(|_| RemoteError::Status {
            endpoint: format!("{}{}", self.base_url, path),
            status: reqwest::StatusCode::BAD_REQUEST,
            body: "invalid mailbox endpoint path".into(),
        })
    }

    async fn send_json(
        &self,
        request: reqwest::RequestBuilder,
        endpoint: String,
        scopes: &[&str],
    ) -> Result<reqwest::Response, RemoteError> {
        let token = self.tokens.acquire_token(scopes).await?;
        let response = request
            .bearer_auth(token.secret())
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
        Ok(response)
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
        endpoint: String,
    ) -> Result<T, RemoteError> {
        response
            .json()
            .await
            .map_err(|source| RemoteError::Decode { endpoint, source })
    }
}

/// The scheduled date-time shape the mailbox API expects.
fn graph_datetime(at: chrono::DateTime<chrono::Utc>) -> serde_json::Value {
    json!({
        "dateTime": at.format("%Y-%m-%dT%H:%M:%S").to_string(),
        "timeZone": "UTC",
    })
}

#[async_trait]
impl MailboxApi for GraphMailboxClient {
    async fn set_automatic_replies(
        &self,
        user_id: &str,
        window: &AbsenceWindow,
        internal_message: &str,
        external_message: &str,
    ) -> Result<(), RemoteError> {
        let path = format!("users/{user_id}/mailboxSettings");
        let url = self.endpoint(&path)?;
        let body = json!({
            "automaticRepliesSetting": {
                "status": "scheduled",
                "externalAudience": "all",
                "scheduledStartDateTime": graph_datetime(window.start),
                "scheduledEndDateTime": graph_datetime(window.end),
                "internalReplyMessage": internal_message,
                "externalReplyMessage": external_message,
            }
        });
        self.send_json(
            self.http.patch(url).json(&body),
            path,
            &[SCOPE_MAILBOX_SETTINGS],
        )
        .await?;
        Ok(())
    }

    async fn create_forwarding_rule(
        &self,
        user_id: &str,
        target: &DirectoryRecord,
    ) -> Result<String, RemoteError> {
        let path = format!("users/{user_id}/mailFolders/inbox/messageRules");
        let url = self.endpoint(&path)?;
        let body = json!({
            "displayName": "Out of office forwarding",
            "sequence": 1,
            // Created disabled; the workflow automation flips it on and off
            // at the window boundaries.
            "isEnabled": false,
            "actions": {
                "forwardTo": [{
                    "emailAddress": {
                        "address": target.mail,
                        "name": target.display_name,
                    }
                }],
                "stopProcessingRules": false,
            }
        });
        let response = self
            .send_json(
                self.http.post(url).json(&body),
                path.clone(),
                &[SCOPE_MAILBOX_SETTINGS],
            )
            .await?;
        let created: CreatedResource = Self::decode(response, path).await?;
        Ok(created.id)
    }

    async fn create_calendar_block(
        &self,
        user_id: &str,
        window: &AbsenceWindow,
        subject: &str,
    ) -> Result<String, RemoteError> {
        let path = format!("users/{user_id}/events");
        let url = self.endpoint(&path)?;
        let body = json!({
            "subject": subject,
            "showAs": "oof",
            "isReminderOn": false,
            "start": graph_datetime(window.start),
            "end": graph_datetime(window.end),
        });
        let response = self
            .send_json(
                self.http.post(url).json(&body),
                path.clone(),
                &[SCOPE_CALENDARS],
            )
            .await?;
        let created: CreatedResource = Self::decode(response, path).await?;
        Ok(created.id)
    }

    async fn create_decline_rule(&self, user_id: &str) -> Result<String, RemoteError> {
        let path = format!("users/{user_id}/mailFolders/inbox/messageRules");
        let url = self.endpoint(&path)?;
        // The mailbox API has no first-class auto-decline toggle; an inbox
        // rule on meeting requests is the closest supported shape.
        let body = json!({
            "displayName": "Out of office invite handling",
            "sequence": 2,
            "isEnabled": true,
            "conditions": {
                "isMeetingRequest": true,
            },
            "actions": {
                "markAsRead": true,
                "delete": true,
                "stopProcessingRules": false,
            }
        });
        let response = self
            .send_json(
                self.http.post(url).json(&body),
                path.clone(),
                &[SCOPE_MAILBOX_SETTINGS],
            )
            .await?;
        let created: CreatedResource = Self::decode(response, path).await?;
        Ok(created.id)
    }

    async fn list_meetings(
        &self,
        user_id: &str,
        window: &AbsenceWindow,
    ) -> Result<Vec<MeetingRef>, RemoteError> {
        let path = format!("users/{user_id}/calendarView");
        let mut url = self.endpoint(&path)?;
        url.query_pairs_mut()
            .append_pair("startDateTime", &window.start.to_rfc3339())
            .append_pair("endDateTime", &window.end.to_rfc3339())
            .append_pair("$select", "id,subject,isOrganizer")
            .append_pair("$top", &CALENDAR_PAGE_SIZE.to_string());
        let response = self
            .send_json(self.http.get(url), path.clone(), &[SCOPE_CALENDARS])
            .await?;
        let list: MeetingListResponse = Self::decode(response, path).await?;
        Ok(list.value)
    }

    async fn decline_meeting(
        &self,
        user_id: &str,
        event_id: &str,
        comment: &str,
    ) -> Result<(), RemoteError> {
        let path = format!("users/{user_id}/events/{event_id}/decline");
        let url = self.endpoint(&path)?;
        let body = json!({
            "comment": comment,
            "sendResponse": true,
        });
        self.send_json(self.http.post(url).json(&body), path, &[SCOPE_CALENDARS])
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn graph_datetime_is_second_precision_utc() {
        let at = chrono::Utc.with_ymd_and_hms(2026, 8, 10, 9, 30, 0).unwrap();
        let value = graph_datetime(at);
        assert_eq!(value["dateTime"], "2026-08-10T09:30:00");
        assert_eq!(value["timeZone"], "UTC");
    }

    #[test]
    fn meeting_list_decodes_with_missing_optionals() {
        let json = r#"{"value": [{"id": "evt1"}, {"id": "evt2", "subject": "standup", "isOrganizer": true}]}"#;
        let list: MeetingListResponse = serde_json::from_str(json).expect("decode");
        assert_eq!(list.value.len(), 2);
        assert!(!list.value[0].is_organizer);
        assert!(list.value[1].is_organizer);
    }
}
