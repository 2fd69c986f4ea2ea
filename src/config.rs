// Session configuration: which SynBioHub server to talk to and which
// namespace the document's identities are minted under. Everything here is
// an explicit value handed to the client; there is no global homespace.

use std::fmt;

use crate::sbol::{Homespace, PartsDocument};

pub const STAGING_URL: &str = "https://hub-staging.sd2e.org";
pub const PRODUCTION_URL: &str = "https://hub.sd2e.org";

/// Namespaces always use the production host, even when submitting to
/// staging, so staged identities match the ones production would mint.
pub const NAMESPACE_HOST: &str = PRODUCTION_URL;
pub const NAMESPACE_USER: &str = "sd2e";

/// Submission target selected by the `--spoof` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Staging,
    Production,
}

impl Target {
    /// `true` selects staging (the spoofed setup), `false` production.
    pub fn from_spoof(spoof: bool) -> Self {
        if spoof {
            Target::Staging
        } else {
            Target::Production
        }
    }

    pub fn is_spoofed(self) -> bool {
        self == Target::Staging
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Staging => f.write_str("staging"),
            Target::Production => f.write_str("production"),
        }
    }
}

/// Server base URLs for both targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub staging: String,
    pub production: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Endpoints {
            staging: STAGING_URL.to_string(),
            production: PRODUCTION_URL.to_string(),
        }
    }
}

impl Endpoints {
    /// Defaults, overridden by `SBH_STAGING_URL` / `SBH_PRODUCTION_URL`
    /// when set. Overrides change where requests go, never the namespace.
    pub fn from_env() -> Self {
        let defaults = Endpoints::default();
        Endpoints {
            staging: std::env::var("SBH_STAGING_URL").unwrap_or(defaults.staging),
            production: std::env::var("SBH_PRODUCTION_URL").unwrap_or(defaults.production),
        }
    }

    pub fn url_for(&self, target: Target) -> &str {
        match target {
            Target::Staging => &self.staging,
            Target::Production => &self.production,
        }
    }
}

/// Where to submit and under which namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub target: Target,
    pub server_url: String,
    pub homespace: Homespace,
}

impl SessionConfig {
    pub fn for_document(target: Target, endpoints: &Endpoints, doc: &PartsDocument) -> Self {
        SessionConfig {
            target,
            server_url: endpoints.url_for(target).trim_end_matches('/').to_string(),
            homespace: collection_homespace(doc.display_id()),
        }
    }
}

/// `https://hub.sd2e.org/user/sd2e/<collection>`
pub fn collection_homespace(collection_id: &str) -> Homespace {
    Homespace::new(format!("{}/user/{}/{}", NAMESPACE_HOST, NAMESPACE_USER, collection_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> PartsDocument {
        PartsDocument::new("Test Parts", "desc")
    }

    #[test]
    fn spoof_talks_to_staging_under_production_namespace() {
        let cfg = SessionConfig::for_document(Target::from_spoof(true), &Endpoints::default(), &doc());
        assert_eq!(cfg.target, Target::Staging);
        assert!(cfg.target.is_spoofed());
        assert_eq!(cfg.server_url, "https://hub-staging.sd2e.org");
        assert_eq!(cfg.homespace.as_str(), "https://hub.sd2e.org/user/sd2e/Test_Parts");
    }

    #[test]
    fn production_uses_production_for_both() {
        let cfg = SessionConfig::for_document(Target::from_spoof(false), &Endpoints::default(), &doc());
        assert_eq!(cfg.target, Target::Production);
        assert_eq!(cfg.server_url, "https://hub.sd2e.org");
        assert!(cfg.homespace.as_str().starts_with(&cfg.server_url));
    }

    #[test]
    fn overridden_endpoint_keeps_namespace() {
        let endpoints = Endpoints {
            staging: "http://127.0.0.1:9000/".to_string(),
            ..Endpoints::default()
        };
        let cfg = SessionConfig::for_document(Target::Staging, &endpoints, &doc());
        assert_eq!(cfg.server_url, "http://127.0.0.1:9000");
        assert_eq!(cfg.homespace.as_str(), "https://hub.sd2e.org/user/sd2e/Test_Parts");
    }
}
