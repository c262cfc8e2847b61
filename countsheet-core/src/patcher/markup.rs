//! In-place cell edits on worksheet markup text.
//!
//! Cells and rows are located by pattern search instead of a parsed document
//! tree, so every byte outside the edited element is left exactly as it was.
//! Rows and cells without an `r` attribute are numbered by position, the same
//! way the reader numbers them.

use crate::address::{CellRef, ColumnAddress};
use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

static ROW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<row(?:\s[^>]*?)?(?:/>|>.*?</row>)"#).expect("row pattern")
});
static CELL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?s)<c(?:\s[^>]*?)?(?:/>|>.*?</c>)"#).expect("cell pattern"));
static REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\sr="([^"]*)""#).expect("reference pattern"));
static STYLE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"\ss="([^"]*)""#).expect("style pattern"));

/// Result of a single cell edit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellEdit {
    /// An existing cell element was rewritten
    Replaced,
    /// A new cell element was added to an existing row
    Inserted,
    /// The row does not exist; the markup is unchanged
    RowMissing,
}

/// Set `cell` to the numeric `value`, replacing or inserting the cell element.
///
/// A replaced cell keeps its style index (`s`) but loses its type, formula and
/// inline content. New cells go before the first cell with a greater column.
pub fn set_numeric_cell(xml: &mut String, cell: CellRef, value: i64) -> CellEdit {
    let reference = cell.to_string();
    let Some(row_span) = find_row(xml, cell.row) else {
        return CellEdit::RowMissing;
    };
    let row_xml = &xml[row_span.clone()];

    if row_xml.ends_with("/>") {
        // <row r="12"/> becomes <row r="12"><c .../></row>
        let open_tag = &row_xml[..row_xml.len() - 2];
        let expanded = format!(
            "{}>{}</row>",
            open_tag.trim_end(),
            numeric_cell(&reference, None, value)
        );
        xml.replace_range(row_span, &expanded);
        return CellEdit::Inserted;
    }

    match locate_cell(row_xml, cell.column, &reference) {
        CellSlot::Existing(span) => {
            let existing = &row_xml[span.clone()];
            let style = attribute(&STYLE, open_tag(existing));
            let replacement = numeric_cell(&reference, style, value);
            let absolute = row_span.start + span.start..row_span.start + span.end;
            xml.replace_range(absolute, &replacement);
            CellEdit::Replaced
        }
        CellSlot::Before(offset) => {
            let new_cell = numeric_cell(&reference, None, value);
            xml.insert_str(row_span.start + offset, &new_cell);
            CellEdit::Inserted
        }
    }
}

/// Minimal numeric cell element
pub fn numeric_cell(reference: &str, style: Option<&str>, value: i64) -> String {
    match style {
        Some(s) => format!(r#"<c r="{}" s="{}"><v>{}</v></c>"#, reference, s, value),
        None => format!(r#"<c r="{}"><v>{}</v></c>"#, reference, value),
    }
}

enum CellSlot {
    Existing(Range<usize>),
    Before(usize),
}

/// Byte range of the row numbered `number`, counting rows without `r` as one
/// past the previous row
fn find_row(xml: &str, number: u32) -> Option<Range<usize>> {
    let mut last = 0u32;
    for m in ROW.find_iter(xml) {
        let current = attribute(&REFERENCE, open_tag(m.as_str()))
            .and_then(|r| r.parse::<u32>().ok())
            .unwrap_or(last.saturating_add(1));
        if current == number {
            return Some(m.range());
        }
        last = current;
    }
    None
}

/// Where `column` lives in a non-empty row element.
///
/// A cell with an `r` attribute matches on the full reference; a cell without
/// one sits one column past its predecessor.
fn locate_cell(row_xml: &str, column: ColumnAddress, reference: &str) -> CellSlot {
    let mut next_index = 0u32;
    for m in CELL.find_iter(row_xml) {
        let explicit = attribute(&REFERENCE, open_tag(m.as_str()));
        let resolved = explicit
            .and_then(|r| CellRef::parse(r).ok())
            .map(|cell_ref| cell_ref.column)
            .unwrap_or_else(|| ColumnAddress::from_index(next_index));
        next_index = resolved.index().saturating_add(1);

        let matches = match explicit {
            Some(r) => r == reference,
            None => resolved == column,
        };
        if matches {
            return CellSlot::Existing(m.range());
        }
        if resolved > column {
            return CellSlot::Before(m.start());
        }
    }
    CellSlot::Before(row_xml.len() - "</row>".len())
}

fn open_tag(element: &str) -> &str {
    match element.find('>') {
        Some(end) => &element[..end],
        None => element,
    }
}

fn attribute<'a>(pattern: &Regex, tag: &'a str) -> Option<&'a str> {
    pattern
        .captures(tag)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}
