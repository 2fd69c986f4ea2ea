// Design sheet interpretation: validates the section layout of the "Design"
// table, builds the empty parts document from its metadata block and fills
// it from the parts block.

use log::{debug, info, warn};

use crate::error::{Error, Result};
use crate::sbol::{is_valid_display_id, Part, PartsDocument};
use crate::workbook::{LabeledRow, LabeledTable, OntologyTerms};

pub const COLLECTION_NAME: &str = "Collection Name:";
pub const DESIGN_DESCRIPTION: &str = "Design Description";
pub const PART_NAME: &str = "Part Name";
pub const COMPOSITE_PARTS: &str = "Composite DNA Parts";

/// Section labels the Design sheet must contain, in sheet order.
pub const SECTION_LABELS: [&str; 4] = [COLLECTION_NAME, DESIGN_DESCRIPTION, PART_NAME, COMPOSITE_PARTS];

pub const ROLE_COLUMN: &str = "Role";
pub const SEQUENCE_COLUMN: &str = "Sequence";
pub const DESCRIPTION_COLUMN: &str = "Description (Optional)";
pub const SOURCE_COLUMN: &str = "Source (Optional)";

/// Row positions of the Design sheet sections, validated up front so the
/// builder and extractor never search for labels themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DesignLayout {
    pub collection_name: usize,
    pub design_description: usize,
    pub part_name: usize,
    pub composite_parts: usize,
}

impl DesignLayout {
    /// Locate every section label in order. Each label is searched for
    /// after the previous one, so a missing label and a misplaced one both
    /// fail with [`Error::MissingField`] naming it.
    pub fn locate(table: &LabeledTable) -> Result<Self> {
        let mut rows = [0usize; SECTION_LABELS.len()];
        let mut from = 0;
        for (slot, label) in rows.iter_mut().zip(SECTION_LABELS) {
            *slot = table.position_from(label, from).ok_or_else(|| {
                if from > 0 && table.position_from(label, 0).is_some() {
                    Error::MissingField(format!("'{}' appears before the section it must follow", label))
                } else {
                    Error::MissingField(format!("'{}'", label))
                }
            })?;
            from = *slot + 1;
        }
        let [collection_name, design_description, part_name, composite_parts] = rows;
        Ok(DesignLayout {
            collection_name,
            design_description,
            part_name,
            composite_parts,
        })
    }
}

/// Create the empty parts document from the metadata block: the collection
/// name sits beside its label, the description is the next labelled row
/// after "Design Description".
pub fn make_parts_doc(table: &LabeledTable, layout: &DesignLayout) -> Result<PartsDocument> {
    let name = table
        .row(layout.collection_name)
        .and_then(|row| row.value(0))
        .ok_or_else(|| Error::MissingField(format!("value for '{}'", COLLECTION_NAME)))?;

    let description = table.rows()[layout.design_description + 1..layout.part_name]
        .iter()
        .find_map(|row| row.label.as_deref())
        .ok_or_else(|| Error::MissingField(format!("text under '{}'", DESIGN_DESCRIPTION)))?;

    let doc = PartsDocument::new(name, description);
    info!("Collection '{}' ({})", doc.name(), doc.display_id());
    Ok(doc)
}

/// Column headers of the parts block, taken from the "Part Name" row.
struct PartColumns {
    headers: Vec<Option<String>>,
}

impl PartColumns {
    fn new(header_row: &LabeledRow) -> Self {
        PartColumns {
            headers: header_row.values.clone(),
        }
    }

    /// Cell under `header` in `row`; an absent column reads as empty.
    fn get<'r>(&self, row: &'r LabeledRow, header: &str) -> Option<&'r str> {
        let idx = self.headers.iter().position(|h| h.as_deref() == Some(header))?;
        row.value(idx)
    }
}

/// Map every labelled row between "Part Name" and "Composite DNA Parts" to
/// a part and append it to `doc`, in sheet order.
///
/// Roles missing from the ontology table are left unset; that is not an
/// error. Source attribution is read but never reaches the document.
pub fn parse_parts(
    table: &LabeledTable,
    layout: &DesignLayout,
    ontology: &OntologyTerms,
    doc: &mut PartsDocument,
) -> Result<()> {
    let rows = table.rows();
    let columns = PartColumns::new(&rows[layout.part_name]);

    for row in &rows[layout.part_name + 1..layout.composite_parts] {
        let Some(name) = row.label.as_deref() else {
            continue;
        };
        let part = build_part(name, row, &columns, ontology)?;
        debug!(
            "Part {} role={:?} sequence={}",
            part.display_id,
            part.role,
            part.sequence.as_ref().map_or(0, |s| s.elements.len())
        );
        doc.add_part(part)?;
    }

    info!("Extracted {} parts", doc.parts().len());
    Ok(())
}

fn build_part(name: &str, row: &LabeledRow, columns: &PartColumns, ontology: &OntologyTerms) -> Result<Part> {
    let mut part = Part::new(name);
    if !is_valid_display_id(&part.display_id) {
        return Err(Error::InvalidIdentifier {
            name: name.to_string(),
            display_id: part.display_id,
        });
    }

    part.description = columns.get(row, DESCRIPTION_COLUMN).map(str::to_string);

    if let Some(role) = columns.get(row, ROLE_COLUMN) {
        match ontology.resolve(role) {
            Some(uri) => part.role = Some(uri.to_string()),
            None => debug!("Role '{}' of {} not in ontology terms, left unset", role, part.display_id),
        }
    }

    if let Some(elements) = columns.get(row, SEQUENCE_COLUMN) {
        part.set_sequence(elements);
    }

    if let Some(source) = columns.get(row, SOURCE_COLUMN) {
        warn!(
            "Source '{}' of {} is not carried into the submitted document",
            source, part.display_id
        );
        part.source = Some(source.to_string());
    }

    Ok(part)
}
