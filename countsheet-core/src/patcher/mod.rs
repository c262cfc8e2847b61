//! Template-preserving write-back of counted quantities.
//!
//! The template is copied to a timestamped output file, the copy is unpacked
//! into a scratch area, the first worksheet's markup is edited cell by cell,
//! and the container is rebuilt. Every entry other than the worksheet is
//! copied raw, so styles, formulas and other sheets are untouched.

pub mod markup;
pub mod scratch;

use crate::address::{CellRef, ColumnAddress};
use crate::config::{CountSheetConfig, MissingRowPolicy};
use crate::error::{CountSheetError, Result};
use crate::naming::claim_output_path;
use crate::reader::first_worksheet_path;
use markup::{CellEdit, set_numeric_cell};
use scratch::ScratchArea;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Row position to new quantity; inserting a row again replaces its value
pub type PendingUpdates = BTreeMap<u32, i64>;

/// Summary of a completed write-back
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchReport {
    pub output_path: PathBuf,
    pub replaced: usize,
    pub inserted: usize,
    /// Rows dropped under `MissingRowPolicy::Skip`
    pub skipped_rows: Vec<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PatchState {
    Unopened,
    Extracted,
    Patched,
    Repacked,
    Done,
}

/// Removes a claimed output file unless the write-back completes
struct OutputGuard {
    path: PathBuf,
    keep: bool,
}

impl OutputGuard {
    fn new(path: PathBuf) -> Self {
        Self { path, keep: false }
    }

    fn into_path(mut self) -> PathBuf {
        self.keep = true;
        std::mem::take(&mut self.path)
    }
}

impl Drop for OutputGuard {
    fn drop(&mut self) {
        if !self.keep && !self.path.as_os_str().is_empty() {
            let _ = fs::remove_file(&self.path);
        }
    }
}

pub struct TemplatePatcher<'a> {
    config: &'a CountSheetConfig,
}

impl<'a> TemplatePatcher<'a> {
    pub fn new(config: &'a CountSheetConfig) -> Self {
        Self { config }
    }

    /// Write `updates` into column `quantity_column` of a copy of `template`.
    ///
    /// The template itself is never modified. Any failure after the existence
    /// check is reported as `WriteFailed`, and the partial output is removed.
    pub fn apply(
        &self,
        template: &Path,
        quantity_column: ColumnAddress,
        updates: &PendingUpdates,
    ) -> Result<PatchReport> {
        if !template.is_file() {
            return Err(CountSheetError::TemplateNotFound(template.to_path_buf()));
        }
        self.run(template, quantity_column, updates)
            .map_err(CountSheetError::into_write_failure)
    }

    fn run(
        &self,
        template: &Path,
        quantity_column: ColumnAddress,
        updates: &PendingUpdates,
    ) -> Result<PatchReport> {
        let mut state = PatchState::Unopened;
        log::debug!("patch {}: {:?}", template.display(), state);

        let output_dir = self.config.output_dir_for(template);
        let output = OutputGuard::new(claim_output_path(
            &output_dir,
            &self.config.patched_prefix,
            "xlsx",
        )?);
        fs::copy(template, &output.path)?;

        let mut report = PatchReport {
            output_path: output.path.clone(),
            replaced: 0,
            inserted: 0,
            skipped_rows: Vec::new(),
        };

        if updates.is_empty() {
            log::info!(
                "no pending updates, {} is a plain copy of {}",
                output.path.display(),
                template.display()
            );
            report.output_path = output.into_path();
            return Ok(report);
        }

        let scratch = ScratchArea::create_in(&self.config.scratch_root())?;
        let mut archive = open_copy(&output.path)?;
        let worksheet_path = match &self.config.worksheet_path {
            Some(path) => path.clone(),
            None => first_worksheet_path(&mut archive)?,
        };
        let parts_dir = scratch.parts_dir();
        archive.extract(&parts_dir)?;
        state = PatchState::Extracted;
        log::debug!("patch {}: {:?} into {}", template.display(), state, parts_dir.display());

        let worksheet_file = parts_dir.join(&worksheet_path);
        if !worksheet_file.is_file() {
            return Err(CountSheetError::InvalidTemplate(format!(
                "worksheet '{}' not found in container",
                worksheet_path
            )));
        }
        let mut xml = String::from_utf8(fs::read(&worksheet_file)?).map_err(|_| {
            CountSheetError::InvalidTemplate(format!("worksheet '{}' is not UTF-8", worksheet_path))
        })?;

        for (&row, &value) in updates {
            let cell = CellRef::new(quantity_column, row);
            match set_numeric_cell(&mut xml, cell, value) {
                CellEdit::Replaced => report.replaced += 1,
                CellEdit::Inserted => report.inserted += 1,
                CellEdit::RowMissing => match self.config.missing_row {
                    MissingRowPolicy::Fail => {
                        return Err(CountSheetError::RowNotFound {
                            row,
                            cell: cell.to_string(),
                        });
                    }
                    MissingRowPolicy::Skip => {
                        log::warn!("row {} not found, update for {} dropped", row, cell);
                        report.skipped_rows.push(row);
                    }
                },
            }
            log::debug!("set {} = {}", cell, value);
        }
        fs::write(&worksheet_file, xml.as_bytes())?;
        state = PatchState::Patched;
        log::debug!("patch {}: {:?}", template.display(), state);

        repack(&mut archive, &worksheet_path, &worksheet_file, &scratch.rebuilt_path())?;
        drop(archive);
        fs::copy(scratch.rebuilt_path(), &output.path)?;
        state = PatchState::Repacked;
        log::debug!("patch {}: {:?}", template.display(), state);

        drop(scratch);
        state = PatchState::Done;
        log::debug!("patch {}: {:?}", template.display(), state);

        report.output_path = output.into_path();
        log::info!(
            "wrote {} ({} replaced, {} inserted, {} skipped)",
            report.output_path.display(),
            report.replaced,
            report.inserted,
            report.skipped_rows.len()
        );
        Ok(report)
    }
}

fn open_copy(path: &Path) -> Result<ZipArchive<BufReader<File>>> {
    let file = File::open(path)?;
    ZipArchive::new(BufReader::new(file)).map_err(|e| match e {
        ZipError::Io(io) => CountSheetError::Io(io),
        other => CountSheetError::InvalidTemplate(format!("not a valid container: {}", other)),
    })
}

/// Rebuild the container in entry order: the worksheet from the scratch area,
/// everything else copied raw from the original entries
fn repack(
    archive: &mut ZipArchive<BufReader<File>>,
    worksheet_path: &str,
    worksheet_file: &Path,
    rebuilt: &Path,
) -> Result<()> {
    let mut zip_writer = ZipWriter::new(File::create(rebuilt)?);

    for i in 0..archive.len() {
        let file = archive.by_index_raw(i)?;
        if file.name() != worksheet_path {
            zip_writer.raw_copy_file(file)?;
            continue;
        }

        let method = match file.compression() {
            CompressionMethod::Stored => CompressionMethod::Stored,
            _ => CompressionMethod::Deflated,
        };
        let name = file.name().to_string();
        drop(file);

        let options = SimpleFileOptions::default().compression_method(method);
        zip_writer.start_file(name.as_str(), options)?;
        zip_writer.write_all(&fs::read(worksheet_file)?)?;
    }

    zip_writer.finish()?;
    Ok(())
}
