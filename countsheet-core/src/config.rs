//! Configuration for parsing, write-back and export

use crate::columns::HeaderLabels;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// What to do when a pending update targets a row absent from the worksheet
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingRowPolicy {
    /// Abort the write-back
    #[default]
    Fail,
    /// Drop the update and report it
    Skip,
}

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CountSheetConfig {
    /// Where patched templates and exports are written (default: next to the template)
    pub output_dir: Option<PathBuf>,
    pub patched_prefix: String,
    pub export_prefix: String,
    /// Parent of the scratch directories (default: OS temp dir)
    pub scratch_dir: Option<PathBuf>,
    /// Fixed internal worksheet path instead of workbook discovery
    pub worksheet_path: Option<String>,
    pub missing_row: MissingRowPolicy,
    pub scratch_max_age_secs: u64,
    /// Extra header label variants keyed by canonical field name
    pub labels: BTreeMap<String, Vec<String>>,
}

impl CountSheetConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: CountSheetConfig = toml::from_str(&content)?;
        // Surface unknown label fields at load time
        config.header_labels()?;
        Ok(config)
    }

    pub fn header_labels(&self) -> Result<HeaderLabels> {
        HeaderLabels::with_extra(&self.labels)
    }

    /// Output directory for a given template
    pub fn output_dir_for(&self, template: &Path) -> PathBuf {
        match &self.output_dir {
            Some(dir) => dir.clone(),
            None => template
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
        }
    }

    pub fn scratch_root(&self) -> PathBuf {
        self.scratch_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    pub fn scratch_max_age(&self) -> Duration {
        Duration::from_secs(self.scratch_max_age_secs)
    }
}

impl Default for CountSheetConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            patched_prefix: "Count".to_string(),
            export_prefix: "Count".to_string(),
            scratch_dir: None,
            worksheet_path: None,
            missing_row: MissingRowPolicy::Fail,
            scratch_max_age_secs: 24 * 60 * 60,
            labels: BTreeMap::new(),
        }
    }
}
