//! Plain comma-separated export of count records

use crate::error::{CountSheetError, Result};
use crate::columns::Field;
use crate::extract::Record;
use crate::naming::claim_output_path;
use std::fs;
use std::path::{Path, PathBuf};

pub const EXPORT_HEADER: [&str; 7] = [
    "Item Description",
    "Dist #",
    "Quantity",
    "UOM",
    "Location",
    "Area",
    "Place",
];

/// Record fields in export column order, one per `EXPORT_HEADER` label
pub const EXPORT_FIELDS: [Field; 7] = [
    Field::Description,
    Field::DistributorId,
    Field::Quantity,
    Field::UnitOfMeasure,
    Field::Location,
    Field::Area,
    Field::Place,
];

/// Serialize records, ordered by row position, into a delimited text buffer.
///
/// Fields containing a comma, quote or line break are quoted with inner
/// quotes doubled. Lines end with `\n`.
pub fn export_to_string(records: &[Record]) -> Result<String> {
    let mut ordered: Vec<&Record> = records.iter().collect();
    ordered.sort_by_key(|r| r.row_position());

    let mut writer = csv::WriterBuilder::new()
        .delimiter(b',')
        .terminator(csv::Terminator::Any(b'\n'))
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(Vec::new());

    writer.write_record(EXPORT_HEADER)?;
    for record in ordered {
        let fields: Vec<_> = EXPORT_FIELDS.iter().map(|f| record.text(*f)).collect();
        writer.write_record(fields.iter().map(|text| text.as_bytes()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| CountSheetError::Io(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| {
        CountSheetError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    })
}

/// Write the export to `<prefix>_<yyyy-MM-dd_HHmm>.csv` in `dir`
pub fn write_export(records: &[Record], dir: &Path, prefix: &str) -> Result<PathBuf> {
    let buffer = export_to_string(records)?;
    let path = claim_output_path(dir, prefix, "csv")?;
    if let Err(e) = fs::write(&path, buffer) {
        let _ = fs::remove_file(&path);
        return Err(e.into());
    }
    log::info!("exported {} records to {}", records.len(), path.display());
    Ok(path)
}
