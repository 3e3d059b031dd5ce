//! Out-of-office CLI host.
//!
//! Applies one out-of-office request from the command line:
//! 1. Reads endpoints and a pre-issued bearer token from the environment
//! 2. (Optional) Resolves the forwarding colleague via a directory search
//! 3. Runs the submission pipeline and prints per-step reports
//!
//! Usage:
//!   cargo run --features cli --bin ooo_cli -- \
//!     --user-id 1f9a... \
//!     --display-name "Dana Example" \
//!     --start 2026-08-10T09:00:00Z \
//!     --end 2026-08-24T17:00:00Z \
//!     --internal-message "Back on the 24th, ask Sam for anything urgent." \
//!     --external-message "I am out of office until August 24th." \
//!     --forward-to sam \
//!     --block-calendar --decline-new-invites

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;

use ooo_assist::absence::{AbsenceWindow, OutOfOfficeRequest, SubmitPipeline};
use ooo_assist::auth::{StaticTokenProvider, TokenProvider};
use ooo_assist::config::{AppConfig, TOKEN_ENV_VAR};
use ooo_assist::directory::{DirectoryLookup, GraphDirectoryClient};
use ooo_assist::search::MAX_CANDIDATES;
use ooo_assist::workflow::HttpWorkflowNotifier;
use ooo_assist::{FailurePolicy, GraphMailboxClient, StepOutcome};

/// Configure an out-of-office period for an organization member.
#[derive(Parser, Debug)]
#[command(name = "ooo_cli")]
struct Args {
    /// Directory id of the member going out of office
    #[arg(long)]
    user_id: String,

    /// Display name of the member
    #[arg(long)]
    display_name: String,

    /// Window start (RFC 3339, e.g. 2026-08-10T09:00:00Z)
    #[arg(long)]
    start: DateTime<Utc>,

    /// Window end (RFC 3339)
    #[arg(long)]
    end: DateTime<Utc>,

    /// Auto-reply for colleagues inside the organization
    #[arg(long)]
    internal_message: String,

    /// Auto-reply for external senders
    #[arg(long)]
    external_message: String,

    /// Free-text directory query for the forwarding colleague; the first
    /// match wins, others are listed
    #[arg(long)]
    forward_to: Option<String>,

    /// Create a blocking calendar event for the window
    #[arg(long)]
    block_calendar: bool,

    /// Create the inbox rule disposing of new meeting requests
    #[arg(long)]
    decline_new_invites: bool,

    /// Decline meetings already scheduled inside the window
    #[arg(long)]
    decline_existing: bool,

    /// Attempt every step even after a failure (default aborts)
    #[arg(long)]
    continue_on_failure: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    let config = AppConfig::from_env().context("loading configuration")?;
    let tokens: Arc<dyn TokenProvider> = Arc::new(
        StaticTokenProvider::from_env(TOKEN_ENV_VAR).context("loading bearer token")?,
    );

    let forward_to = match &args.forward_to {
        Some(query) => Some(resolve_colleague(&config, Arc::clone(&tokens), query).await?),
        None => None,
    };

    let request = OutOfOfficeRequest {
        user_id: args.user_id,
        user_display_name: args.display_name,
        window: AbsenceWindow {
            start: args.start,
            end: args.end,
        },
        internal_message: args.internal_message,
        external_message: args.external_message,
        forward_mail: forward_to.is_some(),
        forward_to,
        block_calendar: args.block_calendar,
        decline_new_invites: args.decline_new_invites,
        decline_existing_meetings: args.decline_existing,
    };

    let mailbox = GraphMailboxClient::new(
        config.graph_base_url.clone(),
        Arc::clone(&tokens),
        config.http_timeout,
    )?;
    let notifier = HttpWorkflowNotifier::new(config.workflow_endpoint.clone(), config.http_timeout)?;
    let policy = if args.continue_on_failure {
        FailurePolicy::ContinueRemaining
    } else {
        FailurePolicy::AbortRemaining
    };
    let pipeline = SubmitPipeline::with_policy(Arc::new(mailbox), Arc::new(notifier), policy);

    let outcome = pipeline.submit(&request).await?;

    println!("submission {}", outcome.submission_id);
    for report in &outcome.reports {
        let rendered = match &report.outcome {
            StepOutcome::Applied { detail } => {
                format!("applied{}", detail.as_deref().map(|d| format!(" ({d})")).unwrap_or_default())
            }
            StepOutcome::Skipped { reason } => format!("skipped ({reason})"),
            StepOutcome::Failed { error } => format!("FAILED ({error})"),
            StepOutcome::NotAttempted => "not attempted".to_string(),
        };
        println!("  {:<26} {}", report.step.as_str(), rendered);
    }

    if let Some(message) = outcome.user_message() {
        bail!("{message}");
    }
    Ok(())
}

/// Resolve the forwarding colleague with a single directory search.
async fn resolve_colleague(
    config: &AppConfig,
    tokens: Arc<dyn TokenProvider>,
    query: &str,
) -> Result<ooo_assist::DirectoryRecord> {
    let directory =
        GraphDirectoryClient::new(config.graph_base_url.clone(), tokens, config.http_timeout)?;
    let matches = directory
        .search_people(query, MAX_CANDIDATES)
        .await
        .with_context(|| format!("searching the directory for '{query}'"))?;

    match matches.split_first() {
        None => bail!("no directory match for '{query}'"),
        Some((first, rest)) => {
            if !rest.is_empty() {
                eprintln!("picking '{}'; other matches:", first.display_name);
                for record in rest {
                    eprintln!("  {} <{}>", record.display_name, record.mail);
                }
            }
            Ok(first.clone())
        }
    }
}
