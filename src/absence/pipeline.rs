//! Ordered submission pipeline.
//!
//! `SubmitPipeline::submit()` is the sole entry point for applying an
//! out-of-office request. It validates locally, then runs the remote steps
//! in a fixed order, each producing exactly one report:
//!
//! ```text
//! 1. auto-reply        (always)
//! 2. forwarding rule   (when a forward target was selected)
//! 3. calendar block    (when requested)
//! 4. decline rule      (when requested)
//! 5. decline existing  (when requested)
//! 6. workflow notice   (always; carries the rule id and the window)
//! ```
//!
//! The failure policy is explicit: under [`FailurePolicy::AbortRemaining`]
//! (the default) a failed step stops the run and the tail reports
//! `NotAttempted`. Steps already applied are **not** rolled back in either
//! mode: a calendar block created before a later failure stays on the
//! calendar, and the reports say so.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use super::mailbox::MailboxApi;
use super::request::OutOfOfficeRequest;
use crate::error::{RemoteError, SubmitError, ValidationError};
use crate::workflow::{WorkflowNotice, WorkflowNotifier};

// ---------------------------------------------------------------------------
// Step vocabulary
// ---------------------------------------------------------------------------

/// The fixed step order of one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    AutoReply,
    ForwardingRule,
    CalendarBlock,
    DeclineRule,
    DeclineExistingMeetings,
    WorkflowNotice,
}

impl StepKind {
    pub const ALL: [StepKind; 6] = [
        StepKind::AutoReply,
        StepKind::ForwardingRule,
        StepKind::CalendarBlock,
        StepKind::DeclineRule,
        StepKind::DeclineExistingMeetings,
        StepKind::WorkflowNotice,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StepKind::AutoReply => "auto-reply",
            StepKind::ForwardingRule => "forwarding-rule",
            StepKind::CalendarBlock => "calendar-block",
            StepKind::DeclineRule => "decline-rule",
            StepKind::DeclineExistingMeetings => "decline-existing-meetings",
            StepKind::WorkflowNotice => "workflow-notice",
        }
    }
}

impl std::fmt::Display for StepKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a single step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StepOutcome {
    /// Step completed; `detail` carries a created resource id or a count.
    Applied { detail: Option<String> },
    /// Step was not requested by the form.
    Skipped { reason: String },
    /// Step failed; `error` is the stringified cause.
    Failed { error: String },
    /// An earlier step failed under the abort policy.
    NotAttempted,
}

/// One step's report, index-aligned with [`StepKind::ALL`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepReport {
    pub step: StepKind,
    #[serde(flatten)]
    pub outcome: StepOutcome,
}

/// What to do with the remaining steps after a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Stop at the first failure; the tail reports `NotAttempted`.
    #[default]
    AbortRemaining,
    /// Keep going; every step gets a real attempt and a real report.
    ContinueRemaining,
}

/// Result of one submission run.
#[derive(Debug)]
pub struct SubmitOutcome {
    /// Correlation id for logs and support tickets.
    pub submission_id: Uuid,
    pub reports: Vec<StepReport>,
    /// Id of the forwarding rule, when one was created.
    pub forwarding_rule_id: Option<String>,
    /// First failure, with its step tag. Applied steps stay applied.
    pub failure: Option<SubmitError>,
}

impl SubmitOutcome {
    pub fn succeeded(&self) -> bool {
        self.failure.is_none()
    }

    /// The single generic message shown to the member on failure.
    pub fn user_message(&self) -> Option<String> {
        self.failure.as_ref().map(SubmitError::user_message)
    }

    pub fn report_for(&self, step: StepKind) -> Option<&StepReport> {
        self.reports.iter().find(|r| r.step == step)
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Applies an [`OutOfOfficeRequest`] through the mailbox API and notifies
/// the workflow automation.
pub struct SubmitPipeline {
    mailbox: Arc<dyn MailboxApi>,
    notifier: Arc<dyn WorkflowNotifier>,
    policy: FailurePolicy,
}

impl SubmitPipeline {
    pub fn new(mailbox: Arc<dyn MailboxApi>, notifier: Arc<dyn WorkflowNotifier>) -> Self {
        Self {
            mailbox,
            notifier,
            policy: FailurePolicy::default(),
        }
    }

    pub fn with_policy(
        mailbox: Arc<dyn MailboxApi>,
        notifier: Arc<dyn WorkflowNotifier>,
        policy: FailurePolicy,
    ) -> Self {
        Self {
            mailbox,
            notifier,
            policy,
        }
    }

    /// Validate locally, then run the steps in order.
    ///
    /// `Err` means validation failed and nothing was attempted remotely.
    /// Remote failures live inside the returned [`SubmitOutcome`].
    pub async fn submit(
        &self,
        request: &OutOfOfficeRequest,
    ) -> Result<SubmitOutcome, ValidationError> {
        request.validate()?;

        let submission_id = Uuid::new_v4();
        info!(%submission_id, user = %request.user_id, "applying out-of-office settings");

        let mut reports: Vec<StepReport> = Vec::with_capacity(StepKind::ALL.len());
        let mut forwarding_rule_id: Option<String> = None;
        let mut failure: Option<SubmitError> = None;

        for step in StepKind::ALL {
            if failure.is_some() && self.policy == FailurePolicy::AbortRemaining {
                reports.push(StepReport {
                    step,
                    outcome: StepOutcome::NotAttempted,
                });
                continue;
            }

            let outcome = self
                .run_step(step, request, &mut forwarding_rule_id)
                .await;

            match outcome {
                Ok(Some(detail)) => {
                    info!(%submission_id, %step, detail = %detail, "step applied");
                    reports.push(StepReport {
                        step,
                        outcome: StepOutcome::Applied {
                            detail: Some(detail),
                        },
                    });
                }
                Ok(None) => {
                    reports.push(StepReport {
                        step,
                        outcome: StepOutcome::Skipped {
                            reason: "not requested".into(),
                        },
                    });
                }
                Err(source) => {
                    warn!(%submission_id, %step, error = %source, "step failed");
                    reports.push(StepReport {
                        step,
                        outcome: StepOutcome::Failed {
                            error: source.to_string(),
                        },
                    });
                    if failure.is_none() {
                        failure = Some(SubmitError::Step { step, source });
                    }
                }
            }
        }

        Ok(SubmitOutcome {
            submission_id,
            reports,
            forwarding_rule_id,
            failure,
        })
    }

    /// Run one step. `Ok(None)` means the form did not request it.
    async fn run_step(
        &self,
        step: StepKind,
        request: &OutOfOfficeRequest,
        forwarding_rule_id: &mut Option<String>,
    ) -> Result<Option<String>, RemoteError> {
        match step {
            StepKind::AutoReply => {
                self.mailbox
                    .set_automatic_replies(
                        &request.user_id,
                        &request.window,
                        &request.internal_message,
                        &request.external_message,
                    )
                    .await?;
                Ok(Some("auto-reply scheduled".into()))
            }
            StepKind::ForwardingRule => match request.forward_target() {
                Some(target) => {
                    let rule_id = self
                        .mailbox
                        .create_forwarding_rule(&request.user_id, target)
                        .await?;
                    *forwarding_rule_id = Some(rule_id.clone());
                    Ok(Some(rule_id))
                }
                None => Ok(None),
            },
            StepKind::CalendarBlock => {
                if !request.block_calendar {
                    return Ok(None);
                }
                let event_id = self
                    .mailbox
                    .create_calendar_block(&request.user_id, &request.window, "Out of office")
                    .await?;
                Ok(Some(event_id))
            }
            StepKind::DeclineRule => {
                if !request.decline_new_invites {
                    return Ok(None);
                }
                let rule_id = self.mailbox.create_decline_rule(&request.user_id).await?;
                Ok(Some(rule_id))
            }
            StepKind::DeclineExistingMeetings => {
                if !request.decline_existing_meetings {
                    return Ok(None);
                }
                let meetings = self
                    .mailbox
                    .list_meetings(&request.user_id, &request.window)
                    .await?;
                let mut declined = 0usize;
                for meeting in meetings.iter().filter(|m| !m.is_organizer) {
                    self.mailbox
                        .decline_meeting(
                            &request.user_id,
                            &meeting.id,
                            &request.internal_message,
                        )
                        .await?;
                    declined += 1;
                }
                Ok(Some(format!("{declined} meetings declined")))
            }
            StepKind::WorkflowNotice => {
                let notice = WorkflowNotice {
                    user_id: request.user_id.clone(),
                    user_display_name: request.user_display_name.clone(),
                    start_date_time: request.window.start,
                    end_date_time: request.window.end,
                    rule_id: forwarding_rule_id.clone(),
                    forward_to_email: request.forward_target().map(|t| t.mail.clone()),
                    forward_to_name: request.forward_target().map(|t| t.display_name.clone()),
                };
                self.notifier.notify(&notice).await?;
                Ok(Some("workflow automation notified".into()))
            }
        }
    }
}
