//! Out-of-office configuration: the request form, the mailbox/calendar API
//! boundary, and the ordered submission pipeline.

pub mod mailbox;
pub mod pipeline;
pub mod request;

pub use mailbox::{GraphMailboxClient, MailboxApi, MeetingRef};
pub use pipeline::{FailurePolicy, StepKind, StepOutcome, StepReport, SubmitOutcome, SubmitPipeline};
pub use request::{AbsenceWindow, OutOfOfficeRequest};
