//! The out-of-office request and its local validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::directory::DirectoryRecord;
use crate::error::ValidationError;

/// The absence time window, UTC end-exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbsenceWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Everything the member filled in before pressing submit.
///
/// Validation runs entirely locally; a request that fails here never causes
/// a remote call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutOfOfficeRequest {
    /// Directory id of the member going out of office.
    pub user_id: String,
    pub user_display_name: String,
    pub window: AbsenceWindow,
    /// Auto-reply shown to colleagues inside the organization.
    pub internal_message: String,
    /// Auto-reply shown to external senders.
    pub external_message: String,
    /// Whether mail should be forwarded while away.
    pub forward_mail: bool,
    /// Colleague picked through the typeahead search. Required when
    /// `forward_mail` is set.
    pub forward_to: Option<DirectoryRecord>,
    pub block_calendar: bool,
    pub decline_new_invites: bool,
    pub decline_existing_meetings: bool,
}

impl OutOfOfficeRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.window.end <= self.window.start {
            return Err(ValidationError::WindowEndsBeforeStart);
        }
        if self.internal_message.trim().is_empty() {
            return Err(ValidationError::MissingInternalMessage);
        }
        if self.external_message.trim().is_empty() {
            return Err(ValidationError::MissingExternalMessage);
        }
        if self.forward_mail && self.forward_to.is_none() {
            return Err(ValidationError::MissingForwardTarget);
        }
        Ok(())
    }

    /// The forwarding target, when forwarding was requested and validated.
    pub fn forward_target(&self) -> Option<&DirectoryRecord> {
        if self.forward_mail {
            self.forward_to.as_ref()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn request() -> OutOfOfficeRequest {
        OutOfOfficeRequest {
            user_id: "u1".into(),
            user_display_name: "Dana Example".into(),
            window: AbsenceWindow {
                start: Utc.with_ymd_and_hms(2026, 8, 10, 9, 0, 0).unwrap(),
                end: Utc.with_ymd_and_hms(2026, 8, 24, 17, 0, 0).unwrap(),
            },
            internal_message: "Back on the 24th — ask Sam for anything urgent.".into(),
            external_message: "I am out of office until August 24th.".into(),
            forward_mail: false,
            forward_to: None,
            block_calendar: false,
            decline_new_invites: false,
            decline_existing_meetings: false,
        }
    }

    #[test]
    fn well_formed_request_passes() {
        assert!(request().validate().is_ok());
    }

    #[test]
    fn inverted_window_is_rejected() {
        let mut r = request();
        std::mem::swap(&mut r.window.start, &mut r.window.end);
        assert_eq!(r.validate(), Err(ValidationError::WindowEndsBeforeStart));
    }

    #[test]
    fn zero_length_window_is_rejected() {
        let mut r = request();
        r.window.end = r.window.start;
        assert_eq!(r.validate(), Err(ValidationError::WindowEndsBeforeStart));
    }

    #[test]
    fn blank_messages_are_rejected() {
        let mut r = request();
        r.internal_message = "   ".into();
        assert_eq!(r.validate(), Err(ValidationError::MissingInternalMessage));

        let mut r = request();
        r.external_message.clear();
        assert_eq!(r.validate(), Err(ValidationError::MissingExternalMessage));
    }

    #[test]
    fn forwarding_without_a_target_is_rejected() {
        let mut r = request();
        r.forward_mail = true;
        assert_eq!(r.validate(), Err(ValidationError::MissingForwardTarget));

        r.forward_to = Some(DirectoryRecord {
            id: "2".into(),
            display_name: "Sam Cover".into(),
            mail: "sam@x.com".into(),
            user_principal_name: "sam@x.com".into(),
            job_title: None,
            department: None,
        });
        assert!(r.validate().is_ok());
        assert!(r.forward_target().is_some());
    }
}
