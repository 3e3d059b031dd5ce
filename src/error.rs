//! Typed error model for the out-of-office service.
//!
//! Every failure maps to exactly one family:
//!
//! ```text
//! local form input        → ValidationError   (no remote call attempted)
//! silent token acquisition → AuthError
//! any downstream HTTP call → RemoteError
//! submit pipeline          → SubmitError (validation | tagged step failure)
//! ```
//!
//! A stale lookup resolution is *not* an error: the search widget discards
//! it silently and logs at `debug!`.
//!
//! ## Rules
//!
//! - `thiserror` for enum derivation, no manual `Display` impls.
//! - No `.unwrap()` in this module.

use reqwest::StatusCode;

use crate::absence::pipeline::StepKind;

// ---------------------------------------------------------------------------
// ValidationError — local, pre-remote
// ---------------------------------------------------------------------------

/// Malformed or missing form input, caught before any remote call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("absence window must end after it starts")]
    WindowEndsBeforeStart,

    #[error("internal auto-reply message is required")]
    MissingInternalMessage,

    #[error("external auto-reply message is required")]
    MissingExternalMessage,

    #[error("mail forwarding requested but no colleague selected")]
    MissingForwardTarget,
}

// ---------------------------------------------------------------------------
// AuthError — credential acquisition
// ---------------------------------------------------------------------------

/// The authentication collaborator could not silently produce a token.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AuthError {
    #[error("token acquisition failed: {reason}")]
    Acquisition { reason: String },

    #[error("{variable} environment variable not set")]
    MissingCredential { variable: &'static str },
}

// ---------------------------------------------------------------------------
// RemoteError — downstream HTTP calls
// ---------------------------------------------------------------------------

/// A downstream HTTP call failed: transport, non-success status, undecodable
/// body, or a credential failure on the call's behalf.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("credential acquisition failed")]
    Credential(#[from] AuthError),

    #[error("request to {endpoint} failed")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned {status}: {body}")]
    Status {
        endpoint: String,
        status: StatusCode,
        /// First 200 chars of the response body.
        body: String,
    },

    #[error("failed to decode response from {endpoint}")]
    Decode {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
}

// ---------------------------------------------------------------------------
// SubmitError — the multi-step settings submission
// ---------------------------------------------------------------------------

/// Submission failure. Remote failures abort the remaining steps; steps
/// already applied are not rolled back.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("out-of-office setup failed at the {step} step")]
    Step {
        step: StepKind,
        #[source]
        source: RemoteError,
    },
}

impl SubmitError {
    /// Single generic message for the host UI. The underlying cause stays on
    /// the error chain for diagnostics.
    pub fn user_message(&self) -> String {
        match self {
            SubmitError::Validation(e) => e.to_string(),
            SubmitError::Step { .. } => {
                "Something went wrong while applying your out-of-office settings. \
                 Some settings may already have been applied."
                    .to_string()
            }
        }
    }
}
