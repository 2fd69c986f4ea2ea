// SynBioHub client: a small blocking HTTP client for the two calls this
// tool needs, login and submit. Every call is a single attempt; failures
// are returned as-is and never retried.

use log::{debug, info};
use reqwest::blocking::{multipart, Client};
use reqwest::header::ACCEPT;
use serde::Serialize;

use crate::config::SessionConfig;
use crate::error::{Error, Result};
use crate::sbol::{PartsDocument, VERSION};

/// Header SynBioHub reads the session token from.
pub const AUTH_HEADER: &str = "X-authorization";

/// Blocking SynBioHub client holding the server base URL and, after a
/// successful login, the session token.
#[derive(Clone)]
pub struct SbhClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

/// Login form. SynBioHub accepts either the account email or username in
/// the `email` field.
#[derive(Serialize)]
pub struct Credentials {
    #[serde(rename = "email")]
    pub username: String,
    pub password: String,
}

/// `overwrite_merge` codes understood by `/submit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionMode {
    /// Create a new collection, fail if it exists
    #[default]
    New,
    Overwrite,
    Merge,
}

impl SubmissionMode {
    pub fn code(self) -> u8 {
        match self {
            SubmissionMode::New => 0,
            SubmissionMode::Overwrite => 1,
            SubmissionMode::Merge => 2,
        }
    }
}

impl SbhClient {
    /// Create a client for the server at `base_url`.
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| Error::Authentication(format!("failed to build HTTP client: {}", e)))?;
        Ok(SbhClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Client for the server selected by `session`.
    pub fn for_session(session: &SessionConfig) -> Result<Self> {
        Self::new(&session.server_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Store a session token for subsequent submissions.
    pub fn set_token(&mut self, token: &str) {
        self.token = Some(token.to_string());
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// POST the credentials to `/login` and return the session token.
    pub fn login(&self, creds: &Credentials) -> Result<String> {
        let url = format!("{}/login", &self.base_url);
        let res = self
            .client
            .post(&url)
            .header(ACCEPT, "text/plain")
            .form(creds)
            .send()
            .map_err(|e| Error::Authentication(format!("could not reach {}: {}", url, e)))?;
        let status = res.status();
        let body = res.text().unwrap_or_default();
        if !status.is_success() {
            return Err(Error::Authentication(format!("{} - {}", status, body.trim())));
        }
        let token = body.trim();
        if token.is_empty() {
            return Err(Error::Authentication("server returned an empty token".into()));
        }
        info!("Logged in to {} as {}", self.base_url, creds.username);
        Ok(token.to_string())
    }

    /// Log in and keep the token on the client.
    pub fn authenticate(&mut self, creds: &Credentials) -> Result<()> {
        let token = self.login(creds)?;
        self.set_token(&token);
        Ok(())
    }

    /// Upload `doc` as a new collection under the session's homespace.
    /// Returns the server's response text.
    pub fn submit(&self, doc: &PartsDocument, session: &SessionConfig, mode: SubmissionMode) -> Result<String> {
        let Some(token) = &self.token else {
            return Err(Error::Submission("not logged in".into()));
        };
        let url = format!("{}/submit", &self.base_url);

        let xml = doc.to_rdf_xml(&session.homespace)?;
        debug!("Submitting {} bytes of SBOL under {}", xml.len(), session.homespace);

        let file = multipart::Part::bytes(xml.into_bytes())
            .file_name(format!("{}.xml", doc.display_id()))
            .mime_str("text/xml")
            .map_err(|e| Error::Submission(e.to_string()))?;
        let form = multipart::Form::new()
            .text("id", doc.display_id().to_string())
            .text("version", VERSION)
            .text("name", doc.name().to_string())
            .text("description", doc.description().to_string())
            .text("citations", "")
            .text("overwrite_merge", mode.code().to_string())
            .part("file", file);

        let res = self
            .client
            .post(&url)
            .header(ACCEPT, "text/plain")
            .header(AUTH_HEADER, token.as_str())
            .multipart(form)
            .send()
            .map_err(|e| Error::Submission(format!("could not reach {}: {}", url, e)))?;
        let status = res.status();
        let body = res.text().unwrap_or_default();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Submission("session token rejected, log in again".into()));
        }
        if !status.is_success() {
            return Err(Error::Submission(format!("{} - {}", status, body.trim())));
        }
        info!("Submitted {} ({} parts) to {}", doc.display_id(), doc.parts().len(), self.base_url);
        Ok(body.trim().to_string())
    }
}
