// Library root
// -----------
// Turns a Build Request workbook into an SBOL parts document and submits it
// to SynBioHub. The binary (`main.rs`) only wires the CLI to `ui::run`.
//
// Module responsibilities:
// - `workbook`: loads the "Design" and "Ontology Terms" sheets.
// - `parser`: validates the Design layout and maps rows to parts.
// - `sbol`: the parts document model and its RDF/XML form.
// - `config`: staging/production endpoints and the namespace to mint under.
// - `api`: blocking SynBioHub client (login, submit).
// - `cli` / `ui`: argument parsing and the run flow.
pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod parser;
pub mod sbol;
pub mod ui;
pub mod workbook;

pub use error::{Error, Result};
