//! Hidden-column detection for `.xlsx` workbooks.
//!
//! calamine exposes cell values but not column visibility, and the
//! drug-price exports hide scratch columns that must not be mapped. This
//! module opens the workbook as a zip archive, resolves the sheet's
//! worksheet part through `xl/workbook.xml` and its relationships, and
//! collects the `<col hidden>` ranges from the raw worksheet XML.

use crate::error::{IngestError, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::Read as _;
use std::path::Path;
use zip::ZipArchive;

/// Zero-based indices of the hidden columns of `sheet`.
pub fn hidden_columns(path: &Path, sheet: &str) -> Result<BTreeSet<usize>> {
    let file = File::open(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut archive = ZipArchive::new(file).map_err(|source| IngestError::ArchiveOpen {
        path: path.to_path_buf(),
        source,
    })?;

    let workbook_xml = read_member(&mut archive, path, "xl/workbook.xml")?;
    let rels_xml = read_member(&mut archive, path, "xl/_rels/workbook.xml.rels")?;

    let part = worksheet_part(&workbook_xml, &rels_xml, sheet).ok_or_else(|| {
        IngestError::WorksheetPart {
            path: path.to_path_buf(),
            sheet: sheet.to_string(),
        }
    })?;
    let worksheet_xml = read_member(&mut archive, path, &part)?;

    Ok(hidden_columns_in_xml(&worksheet_xml))
}

fn read_member(archive: &mut ZipArchive<File>, path: &Path, member: &str) -> Result<String> {
    let mut entry = archive
        .by_name(member)
        .map_err(|_| IngestError::ArchiveMember {
            path: path.to_path_buf(),
            member: member.to_string(),
        })?;
    let mut content = String::new();
    entry
        .read_to_string(&mut content)
        .map_err(|source| IngestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(content)
}

/// Resolves a sheet name to its worksheet XML path via the relationship id.
fn worksheet_part(workbook_xml: &str, rels_xml: &str, sheet: &str) -> Option<String> {
    let mut rid = None;
    let mut reader = Reader::from_str(workbook_xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) if e.name().as_ref() == b"sheet" => {
                let mut name = None;
                let mut id = None;
                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"name" => name = Some(String::from_utf8_lossy(&attr.value).to_string()),
                        b"r:id" => id = Some(String::from_utf8_lossy(&attr.value).to_string()),
                        _ => {}
                    }
                }
                if name.as_deref() == Some(sheet) {
                    rid = id;
                    break;
                }
            }
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
        buf.clear();
    }
    let rid = rid?;

    let mut targets: HashMap<String, String> = HashMap::new();
    let mut reader = Reader::from_str(rels_xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if e.name().as_ref() == b"Relationship" =>
            {
                let mut id = None;
                let mut target = None;
                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"Id" => id = Some(String::from_utf8_lossy(&attr.value).to_string()),
                        b"Target" => {
                            target = Some(String::from_utf8_lossy(&attr.value).to_string());
                        }
                        _ => {}
                    }
                }
                if let (Some(id), Some(target)) = (id, target) {
                    targets.insert(id, target);
                }
            }
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    targets.get(&rid).map(|target| format!("xl/{target}"))
}

/// Scans `<cols>` for hidden ranges. `min`/`max` are one-based inclusive.
fn hidden_columns_in_xml(xml: &str) -> BTreeSet<usize> {
    let mut hidden = BTreeSet::new();
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) if e.name().as_ref() == b"col" => {
                let mut min = None;
                let mut max = None;
                let mut is_hidden = false;
                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"min" => {
                            min = String::from_utf8_lossy(&attr.value).parse::<usize>().ok();
                        }
                        b"max" => {
                            max = String::from_utf8_lossy(&attr.value).parse::<usize>().ok();
                        }
                        b"hidden" => {
                            is_hidden = matches!(attr.value.as_ref(), b"1" | b"true");
                        }
                        _ => {}
                    }
                }
                if is_hidden {
                    if let (Some(min), Some(max)) = (min, max) {
                        for col in min..=max {
                            if col > 0 {
                                hidden.insert(col - 1);
                            }
                        }
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
        buf.clear();
    }
    hidden
}
