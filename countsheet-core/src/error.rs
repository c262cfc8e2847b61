//! Error taxonomy shared by every stage of the count pipeline

use crate::columns::Field;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Distinguishes a template that turned out to be malformed from a failing
/// filesystem or archive operation while writing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteFailureKind {
    Structural,
    Io,
}

impl fmt::Display for WriteFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteFailureKind::Structural => write!(f, "invalid template"),
            WriteFailureKind::Io => write!(f, "archive I/O failure"),
        }
    }
}

#[derive(Error, Debug)]
pub enum CountSheetError {
    #[error("template not found: {}", .0.display())]
    TemplateNotFound(PathBuf),

    #[error("invalid template: {0}")]
    InvalidTemplate(String),

    #[error("missing required columns: {}", format_fields(.0))]
    MissingColumns(Vec<Field>),

    #[error("no data rows found")]
    NoDataRows,

    #[error("write failed ({kind}): {reason}")]
    WriteFailed {
        kind: WriteFailureKind,
        reason: String,
    },

    #[error("row {row} not found in worksheet (cell {cell})")]
    RowNotFound { row: u32, cell: String },

    #[error("no record at row {0}")]
    UnknownRow(u32),

    #[error("invalid cell reference '{0}'")]
    InvalidCellRef(String),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("{0}")]
    Xml(#[from] quick_xml::Error),

    #[error("{0}")]
    XmlAttribute(#[from] quick_xml::events::attributes::AttrError),

    #[error("{0}")]
    Csv(#[from] csv::Error),

    #[error("configuration error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("configuration error: {0}")]
    InvalidConfig(String),
}

impl CountSheetError {
    /// Folds any failure raised after the template copy into `WriteFailed`,
    /// keeping the structural/I-O distinction.
    pub(crate) fn into_write_failure(self) -> Self {
        match self {
            CountSheetError::WriteFailed { .. } => self,
            CountSheetError::InvalidTemplate(reason) => CountSheetError::WriteFailed {
                kind: WriteFailureKind::Structural,
                reason,
            },
            e @ (CountSheetError::RowNotFound { .. }
            | CountSheetError::Xml(_)
            | CountSheetError::XmlAttribute(_)
            | CountSheetError::InvalidCellRef(_)) => CountSheetError::WriteFailed {
                kind: WriteFailureKind::Structural,
                reason: e.to_string(),
            },
            e => CountSheetError::WriteFailed {
                kind: WriteFailureKind::Io,
                reason: e.to_string(),
            },
        }
    }

    /// Canonical names of the missing header fields, if this is a schema mismatch
    pub fn missing_fields(&self) -> Option<Vec<&'static str>> {
        match self {
            CountSheetError::MissingColumns(fields) => {
                Some(fields.iter().map(|f| f.canonical_name()).collect())
            }
            _ => None,
        }
    }
}

fn format_fields(fields: &[Field]) -> String {
    fields
        .iter()
        .map(|f| f.canonical_name())
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, CountSheetError>;
