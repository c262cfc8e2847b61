//! XLSX container reader: first worksheet rows and the shared-string table

use crate::address::{CellRef, ColumnAddress};
use crate::error::{CountSheetError, Result};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek};
use std::path::Path;
use zip::ZipArchive;
use zip::result::ZipError;

pub mod cell;
pub mod shared_strings;

pub use cell::{CellValueResolver, RawCell};
pub use shared_strings::extract_shared_strings;

/// Conventional location of the first worksheet inside the container
pub const CONVENTIONAL_WORKSHEET: &str = "xl/worksheets/sheet1.xml";
pub const SHARED_STRINGS: &str = "xl/sharedStrings.xml";
const WORKBOOK: &str = "xl/workbook.xml";
const WORKBOOK_RELS: &str = "xl/_rels/workbook.xml.rels";

/// One `<row>` of the worksheet with its present cells in document order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetRow {
    /// 1-based physical row number
    pub number: u32,
    pub cells: Vec<RawCell>,
}

/// Rows of the first worksheet plus the shared-string table, if any
#[derive(Debug, Clone, Default)]
pub struct SheetData {
    pub worksheet_path: String,
    pub rows: Vec<SheetRow>,
    pub shared_strings: Option<Vec<String>>,
}

impl SheetData {
    pub fn resolver(&self) -> CellValueResolver<'_> {
        CellValueResolver::new(self.shared_strings.as_deref())
    }
}

/// Open a template container, distinguishing a missing file from a non-zip one
pub fn open_container(path: &Path) -> Result<ZipArchive<BufReader<File>>> {
    if !path.is_file() {
        return Err(CountSheetError::TemplateNotFound(path.to_path_buf()));
    }
    let file = File::open(path)?;
    ZipArchive::new(BufReader::new(file)).map_err(|e| match e {
        ZipError::Io(io) => CountSheetError::Io(io),
        other => CountSheetError::InvalidTemplate(format!(
            "{} is not a valid container: {}",
            path.display(),
            other
        )),
    })
}

/// Read the first worksheet of the container at `path`.
///
/// `worksheet_override` replaces worksheet discovery with a fixed internal path.
pub fn read_sheet(path: &Path, worksheet_override: Option<&str>) -> Result<SheetData> {
    let mut archive = open_container(path)?;
    let worksheet_path = match worksheet_override {
        Some(p) => p.to_string(),
        None => first_worksheet_path(&mut archive)?,
    };

    let shared_strings = if archive.index_for_name(SHARED_STRINGS).is_some() {
        Some(extract_shared_strings(&mut archive)?)
    } else {
        None
    };

    let rows = {
        let sheet = match archive.by_name(&worksheet_path) {
            Ok(file) => file,
            Err(ZipError::FileNotFound) => {
                return Err(CountSheetError::InvalidTemplate(format!(
                    "worksheet '{}' not found in container",
                    worksheet_path
                )));
            }
            Err(e) => return Err(e.into()),
        };
        parse_rows(BufReader::new(sheet))?
    };

    log::debug!(
        "read {} rows from {} ({} shared strings)",
        rows.len(),
        worksheet_path,
        shared_strings.as_ref().map_or(0, Vec::len)
    );

    Ok(SheetData {
        worksheet_path,
        rows,
        shared_strings,
    })
}

/// Resolve the internal path of the first worksheet.
///
/// Follows the first `<sheet>` of the workbook through its relationship;
/// falls back to the conventional path when either part is missing or the
/// target does not exist.
pub fn first_worksheet_path<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<String> {
    let Some(rid) = first_sheet_relationship_id(archive)? else {
        return Ok(CONVENTIONAL_WORKSHEET.to_string());
    };
    let Some(target) = relationship_target(archive, &rid)? else {
        return Ok(CONVENTIONAL_WORKSHEET.to_string());
    };

    let path = if let Some(absolute) = target.strip_prefix('/') {
        absolute.to_string()
    } else {
        format!("xl/{}", target)
    };

    if archive.index_for_name(&path).is_some() {
        Ok(path)
    } else {
        log::debug!(
            "worksheet target '{}' missing, using {}",
            path,
            CONVENTIONAL_WORKSHEET
        );
        Ok(CONVENTIONAL_WORKSHEET.to_string())
    }
}

fn first_sheet_relationship_id<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
) -> Result<Option<String>> {
    let workbook_xml = match archive.by_name(WORKBOOK) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut reader = Reader::from_reader(BufReader::new(workbook_xml));
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) if e.name().as_ref() == b"sheet" => {
                for attr in e.attributes() {
                    let attr = attr?;
                    if attr.key.as_ref() == b"r:id" || attr.key.local_name().as_ref() == b"id" {
                        return Ok(Some(attr.unescape_value()?.to_string()));
                    }
                }
                return Ok(None);
            }
            Event::Eof => return Ok(None),
            _ => {}
        }
        buf.clear();
    }
}

fn relationship_target<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    rid: &str,
) -> Result<Option<String>> {
    let rels_xml = match archive.by_name(WORKBOOK_RELS) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut reader = Reader::from_reader(BufReader::new(rels_xml));
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) if e.name().as_ref() == b"Relationship" => {
                let mut id = String::new();
                let mut target = String::new();
                for attr in e.attributes() {
                    let attr = attr?;
                    match attr.key.as_ref() {
                        b"Id" => id = attr.unescape_value()?.to_string(),
                        b"Target" => target = attr.unescape_value()?.to_string(),
                        _ => {}
                    }
                }
                if id == rid {
                    return Ok(Some(target));
                }
            }
            Event::Eof => return Ok(None),
            _ => {}
        }
        buf.clear();
    }
}

/// Parse every `<row>` of a worksheet document
pub fn parse_rows<R: BufRead>(source: R) -> Result<Vec<SheetRow>> {
    let mut reader = Reader::from_reader(source);
    reader.config_mut().trim_text(false);

    let mut rows = Vec::new();
    let mut current: Option<SheetRow> = None;
    let mut last_row_number = 0u32;
    let mut buf = Vec::new();

    loop {
        let event = reader.read_event_into(&mut buf)?;
        match event {
            Event::Start(ref e) | Event::Empty(ref e) if e.name().as_ref() == b"row" => {
                let number = attribute(e, b"r")?
                    .and_then(|r| r.parse::<u32>().ok())
                    .unwrap_or(last_row_number + 1);
                last_row_number = number;
                let row = SheetRow {
                    number,
                    cells: Vec::new(),
                };
                if matches!(event, Event::Empty(_)) {
                    rows.push(row);
                } else {
                    current = Some(row);
                }
            }
            Event::End(ref e) if e.name().as_ref() == b"row" => {
                if let Some(row) = current.take() {
                    rows.push(row);
                }
            }
            Event::Start(ref e) | Event::Empty(ref e) if e.name().as_ref() == b"c" => {
                let is_empty = matches!(event, Event::Empty(_));
                if let Some(row) = current.as_mut() {
                    let next_column = row.cells.last().map_or(0, |c| c.column.index() + 1);
                    let column = attribute(e, b"r")?
                        .and_then(|r| CellRef::parse(&r).ok())
                        .map(|cell_ref| cell_ref.column)
                        .unwrap_or_else(|| ColumnAddress::from_index(next_column));
                    let mut cell = RawCell {
                        column,
                        cell_type: attribute(e, b"t")?,
                        value: None,
                        inline: None,
                    };
                    if !is_empty {
                        read_cell_contents(&mut reader, &mut cell)?;
                    }
                    row.cells.push(cell);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(rows)
}

fn attribute(e: &BytesStart<'_>, name: &[u8]) -> Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == name {
            return Ok(Some(attr.unescape_value()?.to_string()));
        }
    }
    Ok(None)
}

/// Consume a cell body up to `</c>`, capturing `<v>` and `<is>` text
fn read_cell_contents<R: BufRead>(reader: &mut Reader<R>, cell: &mut RawCell) -> Result<()> {
    let mut buf = Vec::new();
    loop {
        let event = reader.read_event_into(&mut buf)?;
        match event {
            Event::Start(ref e) if e.name().as_ref() == b"v" => {
                cell.value = Some(read_text_node(reader)?);
            }
            Event::Empty(ref e) if e.name().as_ref() == b"v" => {
                cell.value = Some(String::new());
            }
            Event::Start(ref e) if e.name().as_ref() == b"is" => {
                cell.inline = Some(read_rich_text(reader, b"is")?);
            }
            Event::Empty(ref e) if e.name().as_ref() == b"is" => {
                cell.inline = Some(String::new());
            }
            Event::End(ref e) if e.name().as_ref() == b"c" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(())
}

/// Concatenate the `<t>` runs of a string item, skipping phonetic runs
pub(crate) fn read_rich_text<R: BufRead>(reader: &mut Reader<R>, end: &[u8]) -> Result<String> {
    let mut buf = Vec::new();
    let mut text = String::new();
    let mut phonetic = false;
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.name().as_ref() == b"rPh" => phonetic = true,
            Event::End(e) if e.name().as_ref() == b"rPh" => phonetic = false,
            Event::Start(e) if e.name().as_ref() == b"t" => {
                let run = read_text_node(reader)?;
                if !phonetic {
                    text.push_str(&run);
                }
            }
            Event::End(e) if e.name().as_ref() == end => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(text)
}

/// Read text content from an XML node
fn read_text_node<R: BufRead>(reader: &mut Reader<R>) -> Result<String> {
    let mut buf = Vec::new();
    let mut text = String::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Text(e) => text.push_str(e.unescape()?.as_ref()),
            Event::CData(e) => text.push_str(&String::from_utf8_lossy(e.as_ref())),
            Event::End(_) => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(text)
}
