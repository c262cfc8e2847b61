//! A counting session: parsed records, operator edits and write-back

use crate::config::CountSheetConfig;
use crate::error::{CountSheetError, Result};
use crate::export;
use crate::extract::{ParseResult, Record, parse_template};
use crate::patcher::{PatchReport, PendingUpdates, TemplatePatcher};
use std::path::{Path, PathBuf};

/// Owns the records of one template for the duration of a count
#[derive(Debug, Clone)]
pub struct CountingSession {
    template: PathBuf,
    parsed: ParseResult,
    pending: PendingUpdates,
}

impl CountingSession {
    /// Parse `template` and start a session over its records
    pub fn open(template: &Path, config: &CountSheetConfig) -> Result<Self> {
        let parsed = parse_template(template, config)?;
        Ok(Self::from_parsed(template, parsed))
    }

    pub fn from_parsed(template: &Path, parsed: ParseResult) -> Self {
        Self {
            template: template.to_path_buf(),
            parsed,
            pending: PendingUpdates::new(),
        }
    }

    pub fn template(&self) -> &Path {
        &self.template
    }

    pub fn records(&self) -> &[Record] {
        &self.parsed.records
    }

    pub fn record(&self, row_position: u32) -> Option<&Record> {
        self.parsed
            .records
            .iter()
            .find(|r| r.row_position() == row_position)
    }

    /// Record a counted quantity; a later count for the same row replaces it
    pub fn set_quantity(&mut self, row_position: u32, quantity: i64) -> Result<()> {
        let record = self
            .parsed
            .records
            .iter_mut()
            .find(|r| r.row_position() == row_position)
            .ok_or(CountSheetError::UnknownRow(row_position))?;
        record.quantity = quantity;
        self.pending.insert(row_position, quantity);
        Ok(())
    }

    pub fn pending(&self) -> &PendingUpdates {
        &self.pending
    }

    /// Write pending quantities into a copy of the template.
    ///
    /// Pending updates are cleared only once the write-back succeeds.
    pub fn write_back(&mut self, config: &CountSheetConfig) -> Result<PatchReport> {
        let report = TemplatePatcher::new(config).apply(
            &self.template,
            self.parsed.quantity_column,
            &self.pending,
        )?;
        self.pending.clear();
        Ok(report)
    }

    /// Export the current records as delimited text next to the template
    pub fn export(&self, config: &CountSheetConfig) -> Result<PathBuf> {
        let dir = config.output_dir_for(&self.template);
        export::write_export(&self.parsed.records, &dir, &config.export_prefix)
    }
}
