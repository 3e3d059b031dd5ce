//! Wire types for the directory service.

use serde::{Deserialize, Serialize};

/// One organization member as returned by the directory service.
///
/// Immutable once received; ownership passes to whichever widget state holds
/// it as the candidate or committed selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryRecord {
    /// Unique, stable directory id.
    pub id: String,
    pub display_name: String,
    pub mail: String,
    pub user_principal_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
}

impl DirectoryRecord {
    /// Text shown in the search field once this record is committed.
    pub fn display_text(&self) -> &str {
        &self.display_name
    }
}

/// Collection envelope for `GET /users` responses.
#[derive(Debug, Deserialize)]
pub(crate) struct UserListResponse {
    pub value: Vec<DirectoryRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_deserializes_from_directory_json() {
        let json = r#"{
            "id": "1f9a",
            "displayName": "John A",
            "mail": "john.a@x.com",
            "userPrincipalName": "john.a@x.com",
            "jobTitle": "Engineer"
        }"#;
        let record: DirectoryRecord = serde_json::from_str(json).expect("deserialize");
        assert_eq!(record.display_name, "John A");
        assert_eq!(record.job_title.as_deref(), Some("Engineer"));
        assert_eq!(record.department, None);
    }

    #[test]
    fn envelope_unwraps_value_array() {
        let json = r#"{"@odata.context": "...", "value": []}"#;
        let list: UserListResponse = serde_json::from_str(json).expect("deserialize");
        assert!(list.value.is_empty());
    }
}
