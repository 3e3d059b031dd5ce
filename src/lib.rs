//! Out-of-office configuration for organization members.
//!
//! A member sets an absence window, internal/external auto-reply messages,
//! optional mail forwarding to a colleague found through a debounced
//! typeahead directory search, and optional calendar actions. Submission
//! applies the settings through the directory/mailbox API as an ordered
//! pipeline of independent steps and notifies a workflow-automation endpoint
//! that schedules the forwarding rule's enable/disable.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  Host UI / CLI                                                  │
//! └─────────────────────────────────────────────────────────────────┘
//!         │ keystrokes, poll, select            │ submit
//!         ▼                                     ▼
//! ┌─────────────────────────┐    ┌─────────────────────────────────┐
//! │  search::PeopleSearch   │    │  absence::SubmitPipeline        │
//! │  (debounce, staleness)  │    │  (ordered steps, reports)       │
//! └─────────────────────────┘    └─────────────────────────────────┘
//!         │                            │                  │
//!         ▼                            ▼                  ▼
//! ┌─────────────────┐    ┌──────────────────────┐    ┌──────────────────┐
//! │ DirectoryLookup │    │ MailboxApi           │    │ WorkflowNotifier │
//! │ (people search) │    │ (replies, rules,     │    │ (fire-and-forget │
//! │                 │    │  events, declines)   │    │  schedule POST)  │
//! └─────────────────┘    └──────────────────────┘    └──────────────────┘
//! ```
//!
//! Credential acquisition sits behind [`auth::TokenProvider`] and is
//! consumed before every remote call; the handshake itself lives outside
//! this crate.

pub mod absence;
pub mod auth;
pub mod config;
pub mod debounce;
pub mod directory;
pub mod error;
pub mod search;
pub mod workflow;

// Re-export main types
pub use absence::{
    AbsenceWindow, FailurePolicy, GraphMailboxClient, MailboxApi, OutOfOfficeRequest, StepKind,
    StepOutcome, StepReport, SubmitOutcome, SubmitPipeline,
};
pub use auth::{AccessToken, CachingTokenProvider, StaticTokenProvider, TokenProvider};
pub use config::AppConfig;
pub use debounce::Debouncer;
pub use directory::{DirectoryLookup, DirectoryRecord, GraphDirectoryClient};
pub use error::{AuthError, RemoteError, SubmitError, ValidationError};
pub use search::{driver::SearchDriver, LookupTicket, PeopleSearch, SearchStatus};
pub use workflow::{HttpWorkflowNotifier, WorkflowNotice, WorkflowNotifier};
