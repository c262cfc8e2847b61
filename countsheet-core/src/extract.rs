//! Data row extraction into typed count records

use crate::address::ColumnAddress;
use crate::columns::{Field, FieldMap, HeaderLabels, resolve_columns};
use crate::config::CountSheetConfig;
use crate::error::{CountSheetError, Result};
use crate::reader::{self, CellValueResolver, SheetData, SheetRow};
use serde::Serialize;
use std::borrow::Cow;
use std::collections::HashMap;
use std::path::Path;

/// Physical row holding the header labels
pub const HEADER_ROW: u32 = 1;

/// One counted line item.
///
/// Only `quantity` changes after extraction; the text fields are read through
/// accessors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Record {
    pub(crate) description: String,
    pub(crate) distributor_id: String,
    pub(crate) customer_id: String,
    pub quantity: i64,
    pub(crate) unit_of_measure: String,
    pub(crate) location: String,
    pub(crate) area: String,
    pub(crate) place: String,
    row_position: u32,
}

impl Record {
    /// Empty record bound to a physical row
    pub fn new(row_position: u32) -> Self {
        Self {
            row_position,
            ..Self::default()
        }
    }

    /// 1-based physical row in the source worksheet; the write-back join key
    pub fn row_position(&self) -> u32 {
        self.row_position
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn distributor_id(&self) -> &str {
        &self.distributor_id
    }

    pub fn customer_id(&self) -> &str {
        &self.customer_id
    }

    pub fn unit_of_measure(&self) -> &str {
        &self.unit_of_measure
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn area(&self) -> &str {
        &self.area
    }

    pub fn place(&self) -> &str {
        &self.place
    }

    /// Text of `field` as it is exported
    pub fn text(&self, field: Field) -> Cow<'_, str> {
        match field {
            Field::Description => Cow::Borrowed(&self.description),
            Field::DistributorId => Cow::Borrowed(&self.distributor_id),
            Field::CustomerId => Cow::Borrowed(&self.customer_id),
            Field::Quantity => Cow::Owned(self.quantity.to_string()),
            Field::UnitOfMeasure => Cow::Borrowed(&self.unit_of_measure),
            Field::Location => Cow::Borrowed(&self.location),
            Field::Area => Cow::Borrowed(&self.area),
            Field::Place => Cow::Borrowed(&self.place),
        }
    }
}

/// Records of a template plus the column that receives counted quantities
#[derive(Debug, Clone, Serialize)]
pub struct ParseResult {
    pub records: Vec<Record>,
    pub quantity_column: ColumnAddress,
    pub fields: FieldMap,
    pub worksheet_path: String,
}

/// Parse the count template at `path`
pub fn parse_template(path: &Path, config: &CountSheetConfig) -> Result<ParseResult> {
    let labels = config.header_labels()?;
    let data = reader::read_sheet(path, config.worksheet_path.as_deref())?;
    let result = parse_sheet(&data, &labels)?;
    log::info!(
        "parsed {} records from {} (quantity column {})",
        result.records.len(),
        path.display(),
        result.quantity_column
    );
    Ok(result)
}

/// Resolve the header row and extract every data row of an already-read sheet
pub fn parse_sheet(data: &SheetData, labels: &HeaderLabels) -> Result<ParseResult> {
    let resolver = data.resolver();
    let header: Vec<(ColumnAddress, String)> = data
        .rows
        .iter()
        .find(|row| row.number == HEADER_ROW)
        .map(|row| {
            row.cells
                .iter()
                .map(|cell| (cell.column, resolver.resolve(cell)))
                .collect()
        })
        .unwrap_or_default();

    let fields = resolve_columns(&header, labels)?;
    let quantity_column = fields
        .get(Field::Quantity)
        .ok_or_else(|| CountSheetError::MissingColumns(vec![Field::Quantity]))?;

    let data_rows: Vec<&SheetRow> = data
        .rows
        .iter()
        .filter(|row| row.number > HEADER_ROW)
        .collect();
    let records = extract_records(&data_rows, &fields, &resolver)?;

    Ok(ParseResult {
        records,
        quantity_column,
        fields,
        worksheet_path: data.worksheet_path.clone(),
    })
}

/// Build records from the rows following the header.
///
/// A row whose description and distributor id are both empty is a spacer and
/// is skipped. Fails with `NoDataRows` when nothing remains.
pub fn extract_records(
    rows: &[&SheetRow],
    fields: &FieldMap,
    resolver: &CellValueResolver<'_>,
) -> Result<Vec<Record>> {
    let mut records = Vec::new();

    for row in rows {
        let values: HashMap<u32, String> = row
            .cells
            .iter()
            .map(|cell| (cell.column.index(), resolver.resolve(cell)))
            .collect();
        let text = |field: Field| -> String {
            fields
                .get(field)
                .and_then(|column| values.get(&column.index()))
                .cloned()
                .unwrap_or_default()
        };

        let description = text(Field::Description);
        let distributor_id = text(Field::DistributorId);
        if description.trim().is_empty() && distributor_id.trim().is_empty() {
            continue;
        }

        records.push(Record {
            description,
            distributor_id,
            customer_id: text(Field::CustomerId),
            quantity: parse_quantity(&text(Field::Quantity)),
            unit_of_measure: text(Field::UnitOfMeasure),
            location: text(Field::Location),
            area: text(Field::Area),
            place: text(Field::Place),
            row_position: row.number,
        });
    }

    if records.is_empty() {
        return Err(CountSheetError::NoDataRows);
    }
    Ok(records)
}

/// Lenient quantity parsing: blank or non-numeric text counts as zero
pub fn parse_quantity(text: &str) -> i64 {
    let trimmed = text.trim();
    if let Ok(n) = trimmed.parse::<i64>() {
        return n;
    }
    match trimmed.parse::<f64>() {
        Ok(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 => f as i64,
        _ => 0,
    }
}
