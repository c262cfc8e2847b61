//! Timestamped output file names: `<Prefix>_<yyyy-MM-dd_HHmm>.<ext>`

use crate::error::Result;
use chrono::{DateTime, Local, TimeZone};
use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H%M";
const MAX_COLLISIONS: u32 = 1000;

pub fn timestamped_name<Tz: TimeZone>(prefix: &str, ext: &str, at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    candidate_name(prefix, &at.format(TIMESTAMP_FORMAT).to_string(), 1, ext)
}

/// `<prefix>_<stamp>.<ext>` for the first attempt, `<prefix>_<stamp>_<n>.<ext>` after
fn candidate_name(prefix: &str, stamp: &str, attempt: u32, ext: &str) -> String {
    if attempt == 1 {
        format!("{}_{}.{}", prefix, stamp, ext)
    } else {
        format!("{}_{}_{}.{}", prefix, stamp, attempt, ext)
    }
}

/// Create a fresh, empty output file in `dir` and return its path.
///
/// The file is created with create-new semantics. When the minute-granularity
/// name is already taken, `_2`, `_3`, ... is appended before the extension.
pub fn claim_output_path(dir: &Path, prefix: &str, ext: &str) -> Result<PathBuf> {
    claim_output_path_at(dir, prefix, ext, &Local::now())
}

pub fn claim_output_path_at<Tz: TimeZone>(
    dir: &Path,
    prefix: &str,
    ext: &str,
    at: &DateTime<Tz>,
) -> Result<PathBuf>
where
    Tz::Offset: std::fmt::Display,
{
    std::fs::create_dir_all(dir)?;
    let stamp = at.format(TIMESTAMP_FORMAT).to_string();

    for attempt in 1..=MAX_COLLISIONS {
        let path = dir.join(candidate_name(prefix, &stamp, attempt, ext));
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(_) => return Ok(path),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e.into()),
        }
    }

    Err(std::io::Error::new(
        ErrorKind::AlreadyExists,
        format!(
            "no free output name for {}_{}.{} in {}",
            prefix,
            stamp,
            ext,
            dir.display()
        ),
    )
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_timestamped_name_format() {
        let at = Utc.with_ymd_and_hms(2024, 3, 7, 9, 5, 59).unwrap();
        assert_eq!(
            timestamped_name("Count", "xlsx", &at),
            "Count_2024-03-07_0905.xlsx"
        );
    }

    #[test]
    fn test_claim_resolves_collisions() {
        let dir = tempfile::tempdir().unwrap();
        let at = Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 0).unwrap();

        let first = claim_output_path_at(dir.path(), "Count", "csv", &at).unwrap();
        let second = claim_output_path_at(dir.path(), "Count", "csv", &at).unwrap();
        let third = claim_output_path_at(dir.path(), "Count", "csv", &at).unwrap();

        assert_eq!(first.file_name().unwrap(), "Count_2024-12-31_2359.csv");
        assert_eq!(second.file_name().unwrap(), "Count_2024-12-31_2359_2.csv");
        assert_eq!(third.file_name().unwrap(), "Count_2024-12-31_2359_3.csv");
        assert!(first.exists() && second.exists() && third.exists());
    }

    #[test]
    fn test_first_claim_uses_timestamped_name() {
        let dir = tempfile::tempdir().unwrap();
        let at = Utc.with_ymd_and_hms(2025, 2, 3, 4, 5, 6).unwrap();
        let path = claim_output_path_at(dir.path(), "Inventory", "xlsx", &at).unwrap();
        assert_eq!(
            path.file_name().unwrap().to_string_lossy(),
            timestamped_name("Inventory", "xlsx", &at)
        );
    }
}
