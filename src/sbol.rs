// SBOL parts document model and its RDF/XML serialization.
//
// Parts hold only their local display ids. Full identities are minted when
// the document is written, under an explicit `Homespace`, so nothing here
// depends on process-wide namespace state.

use std::fmt;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::{Error, Result};

pub const RDF_NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
pub const DCTERMS_NS: &str = "http://purl.org/dc/terms/";
pub const PROV_NS: &str = "http://www.w3.org/ns/prov#";
pub const SBOL_NS: &str = "http://sbols.org/v2#";

/// BioPAX type tagging every part as a DNA region.
pub const BIOPAX_DNA: &str = "http://www.biopax.org/release/biopax-level3.owl#DnaRegion";
/// IUPAC nucleic acid encoding for raw sequence strings.
pub const IUPAC_DNA: &str = "http://www.chem.qmul.ac.uk/iubmb/misc/naseq.html";

/// Version stamped on every minted identity.
pub const VERSION: &str = "1";

/// Derive an identifier from a display name by replacing every space with
/// an underscore. Idempotent: `display_id_from_name("Part_A") == "Part_A"`.
pub fn display_id_from_name(name: &str) -> String {
    name.replace(' ', "_")
}

/// Whether `id` is usable as an SBOL displayId (`[A-Za-z_][A-Za-z0-9_]*`).
pub fn is_valid_display_id(id: &str) -> bool {
    let mut chars = id.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// URI prefix under which a document's identities are minted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Homespace(String);

impl Homespace {
    pub fn new(uri: impl Into<String>) -> Self {
        let uri = uri.into();
        Homespace(uri.trim_end_matches('/').to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Persistent identity of a top-level object, without version.
    pub fn persistent_identity(&self, display_id: &str) -> String {
        format!("{}/{}", self.0, display_id)
    }

    /// Versioned identity of a top-level object.
    pub fn identity(&self, display_id: &str) -> String {
        format!("{}/{}/{}", self.0, display_id, VERSION)
    }
}

impl fmt::Display for Homespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Raw nucleotide sequence attached to a part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    pub display_id: String,
    pub elements: String,
}

/// One DNA part (an SBOL ComponentDefinition).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    pub display_id: String,
    pub name: String,
    pub description: Option<String>,
    pub role: Option<String>,
    pub sequence: Option<Sequence>,
    /// Free-text source attribution. Captured from the workbook but not
    /// written to the document; SBOL has no plain-text source property.
    pub source: Option<String>,
}

impl Part {
    /// New DNA part named `name`, identified by its derived display id.
    pub fn new(name: &str) -> Self {
        Part {
            display_id: display_id_from_name(name),
            name: name.to_string(),
            description: None,
            role: None,
            sequence: None,
            source: None,
        }
    }

    /// Attach a raw sequence, named `<display_id>_sequence`.
    pub fn set_sequence(&mut self, elements: &str) {
        self.sequence = Some(Sequence {
            display_id: format!("{}_sequence", self.display_id),
            elements: elements.to_string(),
        });
    }
}

/// A named collection of parts, submitted as one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartsDocument {
    name: String,
    display_id: String,
    description: String,
    parts: Vec<Part>,
}

impl PartsDocument {
    pub fn new(name: &str, description: &str) -> Self {
        PartsDocument {
            name: name.to_string(),
            display_id: display_id_from_name(name),
            description: description.to_string(),
            parts: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn display_id(&self) -> &str {
        &self.display_id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Parts in insertion order.
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    pub fn part(&self, display_id: &str) -> Option<&Part> {
        self.parts.iter().find(|p| p.display_id == display_id)
    }

    /// Append a part. Identifiers must be unique within the document.
    pub fn add_part(&mut self, part: Part) -> Result<()> {
        if self.part(&part.display_id).is_some() {
            return Err(Error::DuplicatePart(part.display_id));
        }
        self.parts.push(part);
        Ok(())
    }

    /// Serialize as SBOL2 RDF/XML with identities under `homespace`.
    pub fn to_rdf_xml(&self, homespace: &Homespace) -> Result<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        self.write_rdf(&mut writer, homespace)?;
        String::from_utf8(writer.into_inner()).map_err(|e| {
            Error::Serialization(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })
    }

    fn write_rdf(&self, w: &mut Writer<Vec<u8>>, homespace: &Homespace) -> std::io::Result<()> {
        w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        w.write_event(Event::Start(BytesStart::new("rdf:RDF").with_attributes([
            ("xmlns:rdf", RDF_NS),
            ("xmlns:dcterms", DCTERMS_NS),
            ("xmlns:prov", PROV_NS),
            ("xmlns:sbol", SBOL_NS),
        ])))?;

        for part in &self.parts {
            write_component_definition(w, homespace, part)?;
        }
        for seq in self.parts.iter().filter_map(|p| p.sequence.as_ref()) {
            write_sequence(w, homespace, seq)?;
        }

        w.write_event(Event::End(BytesEnd::new("rdf:RDF")))
    }
}

fn write_component_definition(
    w: &mut Writer<Vec<u8>>,
    homespace: &Homespace,
    part: &Part,
) -> std::io::Result<()> {
    let identity = homespace.identity(&part.display_id);
    w.write_event(Event::Start(
        BytesStart::new("sbol:ComponentDefinition").with_attributes([("rdf:about", identity.as_str())]),
    ))?;
    write_identified(w, homespace, &part.display_id)?;
    write_text(w, "dcterms:title", &part.name)?;
    if let Some(description) = &part.description {
        write_text(w, "dcterms:description", description)?;
    }
    write_resource(w, "sbol:type", BIOPAX_DNA)?;
    if let Some(role) = &part.role {
        write_resource(w, "sbol:role", role)?;
    }
    if let Some(seq) = &part.sequence {
        write_resource(w, "sbol:sequence", &homespace.identity(&seq.display_id))?;
    }
    w.write_event(Event::End(BytesEnd::new("sbol:ComponentDefinition")))
}

fn write_sequence(w: &mut Writer<Vec<u8>>, homespace: &Homespace, seq: &Sequence) -> std::io::Result<()> {
    let identity = homespace.identity(&seq.display_id);
    w.write_event(Event::Start(
        BytesStart::new("sbol:Sequence").with_attributes([("rdf:about", identity.as_str())]),
    ))?;
    write_identified(w, homespace, &seq.display_id)?;
    write_text(w, "sbol:elements", &seq.elements)?;
    write_resource(w, "sbol:encoding", IUPAC_DNA)?;
    w.write_event(Event::End(BytesEnd::new("sbol:Sequence")))
}

fn write_identified(w: &mut Writer<Vec<u8>>, homespace: &Homespace, display_id: &str) -> std::io::Result<()> {
    write_resource(w, "sbol:persistentIdentity", &homespace.persistent_identity(display_id))?;
    write_text(w, "sbol:displayId", display_id)?;
    write_text(w, "sbol:version", VERSION)
}

fn write_text(w: &mut Writer<Vec<u8>>, name: &str, text: &str) -> std::io::Result<()> {
    w.create_element(name).write_text_content(BytesText::new(text))?;
    Ok(())
}

fn write_resource(w: &mut Writer<Vec<u8>>, name: &str, uri: &str) -> std::io::Result<()> {
    w.create_element(name).with_attribute(("rdf:resource", uri)).write_empty()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROMOTER: &str = "http://identifiers.org/so/SO:0000167";

    fn homespace() -> Homespace {
        Homespace::new("https://hub.sd2e.org/user/sd2e/My_Parts/")
    }

    #[test]
    fn display_id_replaces_every_space() {
        assert_eq!(display_id_from_name("Part A"), "Part_A");
        assert_eq!(display_id_from_name("pTet  strong"), "pTet__strong");
        let once = display_id_from_name("Part A");
        assert_eq!(display_id_from_name(&once), once);
    }

    #[test]
    fn display_id_validity() {
        assert!(is_valid_display_id("Part_A"));
        assert!(is_valid_display_id("_x1"));
        assert!(!is_valid_display_id("1st_part"));
        assert!(!is_valid_display_id("pTet-1"));
        assert!(!is_valid_display_id(""));
    }

    #[test]
    fn homespace_mints_versioned_identities() {
        let hs = homespace();
        assert_eq!(hs.as_str(), "https://hub.sd2e.org/user/sd2e/My_Parts");
        assert_eq!(hs.identity("Part_A"), "https://hub.sd2e.org/user/sd2e/My_Parts/Part_A/1");
        assert_eq!(
            hs.persistent_identity("Part_A"),
            "https://hub.sd2e.org/user/sd2e/My_Parts/Part_A"
        );
    }

    #[test]
    fn duplicate_part_is_rejected() {
        let mut doc = PartsDocument::new("My Parts", "desc");
        doc.add_part(Part::new("Part A")).unwrap();
        let err = doc.add_part(Part::new("Part_A")).unwrap_err();
        assert!(matches!(err, Error::DuplicatePart(ref id) if id == "Part_A"));
        assert_eq!(doc.parts().len(), 1);
    }

    #[test]
    fn rdf_xml_carries_role_sequence_and_escapes_text() {
        let mut doc = PartsDocument::new("My Parts", "desc");
        let mut a = Part::new("Part A");
        a.description = Some("Strong <promoter> & friends".to_string());
        a.role = Some(PROMOTER.to_string());
        a.set_sequence("ATGC");
        a.source = Some("iGEM".to_string());
        doc.add_part(a).unwrap();
        doc.add_part(Part::new("Part B")).unwrap();

        let xml = doc.to_rdf_xml(&homespace()).unwrap();

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains(r#"<sbol:ComponentDefinition rdf:about="https://hub.sd2e.org/user/sd2e/My_Parts/Part_A/1">"#));
        assert!(xml.contains(&format!(r#"<sbol:role rdf:resource="{}"/>"#, PROMOTER)));
        assert!(xml.contains(
            r#"<sbol:sequence rdf:resource="https://hub.sd2e.org/user/sd2e/My_Parts/Part_A_sequence/1"/>"#
        ));
        assert!(xml.contains("<sbol:elements>ATGC</sbol:elements>"));
        assert!(xml.contains("Strong &lt;promoter&gt; &amp; friends"));
        assert!(!xml.contains("iGEM"));
        assert_eq!(xml.matches("<sbol:ComponentDefinition ").count(), 2);
        assert_eq!(xml.matches("<sbol:Sequence ").count(), 1);
        assert_eq!(xml.matches(&format!(r#"<sbol:type rdf:resource="{}"/>"#, BIOPAX_DNA)).count(), 2);
    }
}
