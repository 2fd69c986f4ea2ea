// Spreadsheet loader: reads the "Design" and "Ontology Terms" sheets of a
// Build Request workbook into label-addressed tables. Nothing is interpreted
// here; the parser decides what the labels mean.

use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader, Sheets};
use log::{debug, info};

use crate::error::{Error, Result};

pub const DESIGN_SHEET: &str = "Design";
pub const ONTOLOGY_SHEET: &str = "Ontology Terms";

type Workbook = Sheets<Cursor<Vec<u8>>>;

/// One sheet row: the column A label plus every cell to its right.
/// Empty and whitespace-only cells are `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabeledRow {
    pub label: Option<String>,
    pub values: Vec<Option<String>>,
}

impl LabeledRow {
    /// Build a row from raw cell text, column A first. Blank strings become
    /// missing cells, the same way the loader treats them.
    pub fn from_cells(cells: &[&str]) -> Self {
        let mut cells = cells.iter().map(|c| {
            let t = c.trim();
            (!t.is_empty()).then(|| t.to_string())
        });
        let label = cells.next().flatten();
        LabeledRow {
            label,
            values: cells.collect(),
        }
    }

    /// Cell in value column `index` (0 is column B).
    pub fn value(&self, index: usize) -> Option<&str> {
        self.values.get(index).and_then(|v| v.as_deref())
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.label.as_deref() == Some(label)
    }
}

/// Row-indexed table where rows are addressed by their column A label.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabeledTable {
    rows: Vec<LabeledRow>,
}

impl LabeledTable {
    pub fn new(rows: Vec<LabeledRow>) -> Self {
        LabeledTable { rows }
    }

    pub fn rows(&self) -> &[LabeledRow] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&LabeledRow> {
        self.rows.get(index)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the first row labelled `label` at or after `from`.
    pub fn position_from(&self, label: &str, from: usize) -> Option<usize> {
        self.rows
            .iter()
            .enumerate()
            .skip(from)
            .find(|(_, row)| row.has_label(label))
            .map(|(idx, _)| idx)
    }

    /// Convert a calamine range using absolute sheet coordinates, so column A
    /// is always the label column even when the used range starts later.
    fn from_range(range: &Range<Data>) -> Self {
        let Some((last_row, last_col)) = range.end() else {
            return LabeledTable::default();
        };
        let rows = (0..=last_row)
            .map(|r| LabeledRow {
                label: range.get_value((r, 0)).and_then(cell_text),
                values: (1..=last_col)
                    .map(|c| range.get_value((r, c)).and_then(cell_text))
                    .collect(),
            })
            .collect();
        LabeledTable { rows }
    }
}

/// Role name to canonical ontology URI, from the "Ontology Terms" sheet.
#[derive(Debug, Clone, Default)]
pub struct OntologyTerms {
    terms: HashMap<String, String>,
}

impl OntologyTerms {
    /// The first row of the sheet is its header and is skipped. When a role
    /// name appears twice the first URI wins.
    pub fn from_table(table: &LabeledTable) -> Self {
        table
            .rows()
            .iter()
            .skip(1)
            .filter_map(|row| Some((row.label.clone()?, row.value(0)?.to_string())))
            .collect()
    }

    pub fn resolve(&self, role: &str) -> Option<&str> {
        self.terms.get(role).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for OntologyTerms {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut terms = HashMap::new();
        for (name, uri) in iter {
            terms.entry(name.into()).or_insert_with(|| uri.into());
        }
        OntologyTerms { terms }
    }
}

/// Both tables of a Build Request workbook, unprocessed.
#[derive(Debug, Clone)]
pub struct BuildRequest {
    pub design: LabeledTable,
    pub ontology: OntologyTerms,
}

/// Load the "Design" and "Ontology Terms" sheets from `path`.
///
/// The workbook format is detected from the file content, not its
/// extension. An unreadable path is an [`Error::Io`]; anything that is not
/// a workbook, or lacks one of the two sheets, is an [`Error::FileFormat`].
pub fn load_build_request(path: &Path) -> Result<BuildRequest> {
    let bytes = std::fs::read(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| Error::FileFormat(format!("{}: {}", path.display(), e)))?;

    let design = read_sheet(&mut workbook, DESIGN_SHEET)?;
    let ontology = OntologyTerms::from_table(&read_sheet(&mut workbook, ONTOLOGY_SHEET)?);

    info!(
        "Loaded {}: {} design rows, {} ontology terms",
        path.display(),
        design.len(),
        ontology.len()
    );
    Ok(BuildRequest { design, ontology })
}

fn read_sheet(workbook: &mut Workbook, name: &str) -> Result<LabeledTable> {
    if !workbook.sheet_names().iter().any(|s| s == name) {
        return Err(Error::FileFormat(format!("missing sheet '{}'", name)));
    }
    let range = workbook
        .worksheet_range(name)
        .map_err(|e| Error::FileFormat(format!("failed to read sheet '{}': {}", name, e)))?;
    debug!("Sheet '{}' spans {:?}..{:?}", name, range.start(), range.end());
    Ok(LabeledTable::from_range(&range))
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) => {
            let t = s.trim();
            (!t.is_empty()).then(|| t.to_string())
        }
        // Whole numbers read back as integers ("3", not "3.0")
        Data::Float(f) if f.is_finite() && f.fract() == 0.0 => Some((*f as i64).to_string()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook as XlsxWorkbook;
    use tempfile::TempDir;

    fn write_workbook(dir: &TempDir, with_ontology: bool) -> std::path::PathBuf {
        let path = dir.path().join("build_request.xlsx");
        let mut wb = XlsxWorkbook::new();

        let design = wb.add_worksheet();
        design.set_name(DESIGN_SHEET).unwrap();
        design.write_string(0, 0, "Collection Name:").unwrap();
        design.write_string(0, 1, "My Parts").unwrap();
        // Row 1 has no label but a stray value
        design.write_string(1, 2, "stray").unwrap();
        design.write_string(2, 0, "Part Name").unwrap();
        design.write_number(2, 1, 42.0).unwrap();
        design.write_string(2, 2, "   ").unwrap();

        if with_ontology {
            let terms = wb.add_worksheet();
            terms.set_name(ONTOLOGY_SHEET).unwrap();
            terms.write_string(0, 0, "Term").unwrap();
            terms.write_string(0, 1, "URI").unwrap();
            terms.write_string(1, 0, "Promoter").unwrap();
            terms.write_string(1, 1, "http://identifiers.org/so/SO:0000167").unwrap();
            terms.write_string(2, 0, "Promoter").unwrap();
            terms.write_string(2, 1, "http://example.org/duplicate").unwrap();
        }

        wb.save(&path).unwrap();
        path
    }

    #[test]
    fn loads_design_rows_by_label() {
        let dir = TempDir::new().unwrap();
        let request = load_build_request(&write_workbook(&dir, true)).unwrap();

        let design = &request.design;
        assert_eq!(design.len(), 3);
        assert_eq!(design.position_from("Collection Name:", 0), Some(0));
        assert_eq!(design.row(0).unwrap().value(0), Some("My Parts"));
        assert_eq!(design.row(1).unwrap().label, None);
        assert_eq!(design.row(1).unwrap().value(1), Some("stray"));
        assert_eq!(design.row(2).unwrap().value(0), Some("42"));
        assert_eq!(design.row(2).unwrap().value(1), None);
    }

    #[test]
    fn ontology_skips_header_and_keeps_first_term() {
        let dir = TempDir::new().unwrap();
        let request = load_build_request(&write_workbook(&dir, true)).unwrap();

        assert_eq!(request.ontology.len(), 1);
        assert_eq!(
            request.ontology.resolve("Promoter"),
            Some("http://identifiers.org/so/SO:0000167")
        );
        assert_eq!(request.ontology.resolve("Term"), None);
    }

    #[test]
    fn missing_ontology_sheet_is_a_format_error() {
        let dir = TempDir::new().unwrap();
        let err = load_build_request(&write_workbook(&dir, false)).unwrap_err();
        assert!(matches!(err, Error::FileFormat(ref msg) if msg.contains(ONTOLOGY_SHEET)));
    }

    #[test]
    fn unreadable_path_is_an_io_error() {
        let dir = TempDir::new().unwrap();
        let err = load_build_request(&dir.path().join("nope.xlsx")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn non_workbook_is_a_format_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.xlsx");
        std::fs::write(&path, b"just some text").unwrap();
        let err = load_build_request(&path).unwrap_err();
        assert!(matches!(err, Error::FileFormat(_)));
    }

    #[test]
    fn from_cells_treats_blank_as_missing() {
        let row = LabeledRow::from_cells(&["Part A", "", " ATGC "]);
        assert_eq!(row.label.as_deref(), Some("Part A"));
        assert_eq!(row.value(0), None);
        assert_eq!(row.value(1), Some("ATGC"));
        assert_eq!(row.value(5), None);
    }
}
