// Error taxonomy for the whole pipeline. Nothing in the crate recovers from
// these: every variant propagates up to `main` and ends the run.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while loading, building or submitting a parts document.
#[derive(Debug, Error)]
pub enum Error {
    /// The workbook path could not be read
    #[error("Failed to read {}: {}", path.display(), source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Not a workbook, or a required sheet is absent
    #[error("Invalid build request workbook: {0}")]
    FileFormat(String),

    /// An expected structural label is absent or out of place
    #[error("Missing field in Design sheet: {0}")]
    MissingField(String),

    /// A part name does not produce a usable identifier
    #[error("Part name '{name}' yields invalid identifier '{display_id}'")]
    InvalidIdentifier { name: String, display_id: String },

    /// Two parts derive the same identifier
    #[error("Duplicate part identifier: {0}")]
    DuplicatePart(String),

    /// Login rejected or unreachable
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Server rejected the submission or could not be reached
    #[error("Submission failed: {0}")]
    Submission(String),

    /// Writing the RDF/XML document failed
    #[error("Failed to serialize SBOL document: {0}")]
    Serialization(#[from] std::io::Error),
}
