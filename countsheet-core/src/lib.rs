//! countsheet-core: inventory count templates round-trip
//!
//! Reads a count template (XLSX), turns its data rows into records, and writes
//! counted quantities back into a copy of the original file without touching
//! any other cell, style or part of the container. A plain comma-separated
//! export is available when the template layout does not need preserving.

pub mod address;
pub mod cache;
pub mod columns;
pub mod config;
pub mod error;
pub mod export;
pub mod extract;
pub mod naming;
pub mod patcher;
pub mod reader;
pub mod session;

pub use address::{CellRef, ColumnAddress};
pub use columns::{Field, FieldMap, HeaderLabels};
pub use config::{CountSheetConfig, MissingRowPolicy};
pub use error::{CountSheetError, Result, WriteFailureKind};
pub use extract::{ParseResult, Record, parse_template};
pub use patcher::{PatchReport, PendingUpdates, TemplatePatcher};
pub use session::CountingSession;
