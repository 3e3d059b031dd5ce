//! End-to-end form flow: pick a colleague through the typeahead widget,
//! build the request from the selection, and run the submission pipeline
//! against fake collaborators.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use ooo_assist::absence::{
    AbsenceWindow, MailboxApi, MeetingRef, OutOfOfficeRequest, StepKind, StepOutcome,
    SubmitPipeline,
};
use ooo_assist::directory::DirectoryRecord;
use ooo_assist::error::RemoteError;
use ooo_assist::search::{PeopleSearch, SearchStatus};
use ooo_assist::workflow::{WorkflowNotice, WorkflowNotifier};

fn sam() -> DirectoryRecord {
    DirectoryRecord {
        id: "2".into(),
        display_name: "Sam Cover".into(),
        mail: "sam.cover@x.com".into(),
        user_principal_name: "sam.cover@x.com".into(),
        job_title: Some("Engineer".into()),
        department: Some("Platform".into()),
    }
}

#[derive(Default)]
struct RecordingMailbox {
    calls: Mutex<Vec<String>>,
}

#[async_trait]
impl MailboxApi for RecordingMailbox {
    async fn set_automatic_replies(
        &self,
        user_id: &str,
        _window: &AbsenceWindow,
        _internal: &str,
        _external: &str,
    ) -> Result<(), RemoteError> {
        self.calls.lock().unwrap().push(format!("replies:{user_id}"));
        Ok(())
    }

    async fn create_forwarding_rule(
        &self,
        _user_id: &str,
        target: &DirectoryRecord,
    ) -> Result<String, RemoteError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("forward-to:{}", target.mail));
        Ok("rule-7".into())
    }

    async fn create_calendar_block(
        &self,
        _user_id: &str,
        _window: &AbsenceWindow,
        subject: &str,
    ) -> Result<String, RemoteError> {
        self.calls.lock().unwrap().push(format!("block:{subject}"));
        Ok("evt-9".into())
    }

    async fn create_decline_rule(&self, _user_id: &str) -> Result<String, RemoteError> {
        self.calls.lock().unwrap().push("decline-rule".into());
        Ok("rule-8".into())
    }

    async fn list_meetings(
        &self,
        _user_id: &str,
        _window: &AbsenceWindow,
    ) -> Result<Vec<MeetingRef>, RemoteError> {
        Ok(vec![])
    }

    async fn decline_meeting(
        &self,
        _user_id: &str,
        _event_id: &str,
        _comment: &str,
    ) -> Result<(), RemoteError> {
        Ok(())
    }
}

#[derive(Default)]
struct RecordingNotifier {
    notices: Mutex<Vec<WorkflowNotice>>,
}

#[async_trait]
impl WorkflowNotifier for RecordingNotifier {
    async fn notify(&self, notice: &WorkflowNotice) -> Result<(), RemoteError> {
        self.notices.lock().unwrap().push(notice.clone());
        Ok(())
    }
}

#[tokio::test]
async fn selected_colleague_flows_into_the_workflow_notice() {
    // The member finds Sam through the typeahead widget.
    let mut widget = PeopleSearch::with_debounce(Duration::from_millis(400));
    let t0 = Instant::now();
    widget.set_query("sam");
    let _ = widget.poll(t0);
    let ticket = widget
        .poll(t0 + Duration::from_millis(400))
        .expect("settled query dispatches");
    assert_eq!(ticket.query, "sam");
    widget.resolve(ticket.generation, Ok(vec![sam()]));
    let chosen = widget.candidates()[0].clone();
    widget.select(chosen.clone());
    assert_eq!(widget.status(), SearchStatus::Idle);

    // The form submits with that selection.
    let request = OutOfOfficeRequest {
        user_id: "u1".into(),
        user_display_name: "Dana Example".into(),
        window: AbsenceWindow {
            start: Utc.with_ymd_and_hms(2026, 8, 10, 9, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2026, 8, 24, 17, 0, 0).unwrap(),
        },
        internal_message: "Out until the 24th — Sam covers.".into(),
        external_message: "Out of office until August 24th.".into(),
        forward_mail: true,
        forward_to: widget.selected().cloned(),
        block_calendar: true,
        decline_new_invites: false,
        decline_existing_meetings: false,
    };

    let mailbox = Arc::new(RecordingMailbox::default());
    let pipeline = SubmitPipeline::new(mailbox.clone(), Arc::new(RecordingNotifier::default()));
    let outcome = pipeline.submit(&request).await.expect("valid request");

    assert!(outcome.succeeded());
    assert_eq!(outcome.forwarding_rule_id.as_deref(), Some("rule-7"));
    assert_eq!(
        mailbox.calls.lock().unwrap().first().map(String::as_str),
        Some("replies:u1")
    );
    assert_eq!(outcome.reports.len(), StepKind::ALL.len());
    assert!(matches!(
        outcome.report_for(StepKind::DeclineRule).unwrap().outcome,
        StepOutcome::Skipped { .. }
    ));
}

#[tokio::test]
async fn notice_carries_rule_id_window_and_forward_target() {
    let request = OutOfOfficeRequest {
        user_id: "u1".into(),
        user_display_name: "Dana Example".into(),
        window: AbsenceWindow {
            start: Utc.with_ymd_and_hms(2026, 8, 10, 9, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2026, 8, 24, 17, 0, 0).unwrap(),
        },
        internal_message: "Out.".into(),
        external_message: "Out.".into(),
        forward_mail: true,
        forward_to: Some(sam()),
        block_calendar: false,
        decline_new_invites: false,
        decline_existing_meetings: false,
    };

    let notifier = Arc::new(RecordingNotifier::default());
    let pipeline = SubmitPipeline::new(Arc::new(RecordingMailbox::default()), notifier.clone());
    let outcome = pipeline.submit(&request).await.expect("valid request");
    assert!(outcome.succeeded());

    let notices = notifier.notices.lock().unwrap();
    assert_eq!(notices.len(), 1);
    let notice = &notices[0];
    assert_eq!(notice.user_id, "u1");
    assert_eq!(notice.rule_id.as_deref(), Some("rule-7"));
    assert_eq!(notice.forward_to_email.as_deref(), Some("sam.cover@x.com"));
    assert_eq!(notice.forward_to_name.as_deref(), Some("Sam Cover"));
    assert_eq!(notice.start_date_time, request.window.start);
    assert_eq!(notice.end_date_time, request.window.end);
}
