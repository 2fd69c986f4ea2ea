// Command-line surface. Flag names follow the historical tool, including
// the two-letter `-br` short flag, which clap cannot express directly and
// is rewritten before parsing.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser};

use crate::config::Target;

const LEGACY_BUILD_REQUEST: &str = "-br";
const BUILD_REQUEST_LONG: &str = "--build_request_excel";

#[derive(Parser, Debug)]
#[command(
    name = "build-request-parser",
    version,
    about = "Parses Build Request excel document for DNA parts and submits to SynBioHub"
)]
pub struct Args {
    /// Full path to the Build Request excel document (also `-br`)
    #[arg(short = 'b', long = "build_request_excel", value_name = "PATH")]
    pub build_request_excel: PathBuf,

    /// SD2 SynBioHub username
    #[arg(short = 'u', long = "sbh_username", env = "SBH_USERNAME")]
    pub sbh_username: String,

    /// SD2 SynBioHub password
    #[arg(short = 'p', long = "sbh_password", env = "SBH_PASSWORD", hide_env_values = true)]
    pub sbh_password: String,

    /// Submit to the staging server (true) or the production server (false)
    #[arg(
        short = 's',
        long = "spoof",
        value_name = "BOOL",
        default_value_t = true,
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    pub spoof: bool,
}

impl Args {
    /// Parse the process arguments, accepting `-br`.
    pub fn parse_args() -> Self {
        Args::parse_from(normalize_legacy_flags(std::env::args_os()))
    }

    pub fn target(&self) -> Target {
        Target::from_spoof(self.spoof)
    }
}

/// Rewrite `-br <path>` and `-br=<path>` into `--build_request_excel`.
/// Only whole tokens are touched, so values that merely start with `-br`
/// after a flag are left alone.
pub fn normalize_legacy_flags<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    args.into_iter()
        .map(Into::into)
        .map(|arg| match arg.to_str() {
            Some(LEGACY_BUILD_REQUEST) => OsString::from(BUILD_REQUEST_LONG),
            Some(s) if s.starts_with("-br=") => {
                OsString::from(format!("{}={}", BUILD_REQUEST_LONG, &s[LEGACY_BUILD_REQUEST.len() + 1..]))
            }
            _ => arg,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(normalize_legacy_flags(
            std::iter::once("build-request-parser").chain(args.iter().copied()),
        ))
    }

    #[test]
    fn legacy_short_flag_is_accepted() {
        let args = parse(&["-br", "request.xlsx", "-u", "alice", "-p", "secret"]).unwrap();
        assert_eq!(args.build_request_excel, PathBuf::from("request.xlsx"));
        assert_eq!(args.sbh_username, "alice");
        assert_eq!(args.sbh_password, "secret");
        assert!(args.spoof);
        assert_eq!(args.target(), Target::Staging);

        let args = parse(&["-br=other.xlsx", "-u", "a", "-p", "b"]).unwrap();
        assert_eq!(args.build_request_excel, PathBuf::from("other.xlsx"));
    }

    #[test]
    fn spoof_false_selects_production() {
        for value in ["False", "false", "0", "no"] {
            let args = parse(&["-br", "r.xlsx", "-u", "a", "-p", "b", "-s", value]).unwrap();
            assert!(!args.spoof, "{} should disable spoofing", value);
            assert_eq!(args.target(), Target::Production);
        }
        let args = parse(&["--build_request_excel", "r.xlsx", "-u", "a", "-p", "b", "--spoof", "True"]).unwrap();
        assert!(args.spoof);
    }

    #[test]
    fn rejects_non_boolean_spoof() {
        assert!(parse(&["-br", "r.xlsx", "-u", "a", "-p", "b", "-s", "maybe"]).is_err());
    }

    #[test]
    fn normalize_leaves_other_tokens() {
        let out = normalize_legacy_flags(["prog", "-u", "-brave", "-br"]);
        assert_eq!(out, ["prog", "-u", "-brave", BUILD_REQUEST_LONG].map(OsString::from));
    }
}
