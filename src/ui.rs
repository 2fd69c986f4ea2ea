// Run flow: load -> build -> extract -> authenticate -> submit, with a
// terminal spinner around the two network calls. Any failure ends the run;
// the half-built document is simply dropped.

use std::time::Duration;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::info;

use crate::api::{Credentials, SbhClient, SubmissionMode};
use crate::cli::Args;
use crate::config::{Endpoints, SessionConfig};
use crate::parser::{make_parts_doc, parse_parts, DesignLayout};
use crate::sbol::PartsDocument;
use crate::workbook::load_build_request;

/// What a successful run produced.
#[derive(Debug)]
pub struct RunReport {
    pub document: PartsDocument,
    pub session: SessionConfig,
    /// Response text returned by `/submit`
    pub response: String,
}

/// Execute the whole pipeline for `args` against `endpoints`.
pub fn run(args: &Args, endpoints: &Endpoints) -> Result<RunReport> {
    let path = &args.build_request_excel;
    let request = load_build_request(path)
        .with_context(|| format!("Failed to load build request {}", path.display()))?;

    let layout = DesignLayout::locate(&request.design).context("Unexpected Design sheet layout")?;
    let mut document = make_parts_doc(&request.design, &layout).context("Failed to read collection metadata")?;
    parse_parts(&request.design, &layout, &request.ontology, &mut document)
        .context("Failed to read parts")?;

    let session = SessionConfig::for_document(args.target(), endpoints, &document);
    info!(
        "Target {} at {} (namespace {})",
        session.target, session.server_url, session.homespace
    );

    let mut client = SbhClient::for_session(&session)?;
    let creds = Credentials {
        username: args.sbh_username.clone(),
        password: args.sbh_password.clone(),
    };
    with_spinner("Logging in...", || client.authenticate(&creds))?;

    let response = with_spinner("Submitting parts...", || {
        client.submit(&document, &session, SubmissionMode::New)
    })?;

    Ok(RunReport {
        document,
        session,
        response,
    })
}

/// Show a spinner while `f` runs. Cleared on both success and failure so
/// the error printed afterwards is not interleaved with it.
fn with_spinner<T, E>(
    message: &'static str,
    f: impl FnOnce() -> std::result::Result<T, E>,
) -> std::result::Result<T, E> {
    let spinner = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner} {msg}").unwrap_or_else(|_| ProgressStyle::default_spinner());
    spinner.set_style(style);
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    let result = f();
    spinner.finish_and_clear();
    result
}
