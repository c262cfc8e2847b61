//! Column letters and cell references (`E12`)

use crate::error::{CountSheetError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Physical column of a worksheet, zero-based
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ColumnAddress {
    index: u32,
}

impl ColumnAddress {
    pub fn from_index(index: u32) -> Self {
        Self { index }
    }

    /// Parse column letters ("A", "AA", ...). Only uppercase ASCII is accepted.
    pub fn from_letters(letters: &str) -> Option<Self> {
        letters_to_index(letters).map(Self::from_index)
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn letters(&self) -> String {
        index_to_letters(self.index)
    }
}

impl fmt::Display for ColumnAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.letters())
    }
}

/// Convert a zero-based column index to letters (0 -> A, 25 -> Z, 26 -> AA)
pub fn index_to_letters(index: u32) -> String {
    let mut n = u64::from(index) + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// Convert column letters to a zero-based index.
///
/// Returns `None` for an empty string, any character outside `A-Z`, or a
/// value that does not fit the index type.
pub fn letters_to_index(letters: &str) -> Option<u32> {
    if letters.is_empty() {
        return None;
    }
    let mut acc: u64 = 0;
    for b in letters.bytes() {
        if !b.is_ascii_uppercase() {
            return None;
        }
        acc = acc.checked_mul(26)?.checked_add(u64::from(b - b'A' + 1))?;
        if acc > u64::from(u32::MAX) + 1 {
            return None;
        }
    }
    u32::try_from(acc - 1).ok()
}

/// A single cell address: column letters followed by a 1-based row number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRef {
    pub column: ColumnAddress,
    pub row: u32,
}

impl CellRef {
    pub fn new(column: ColumnAddress, row: u32) -> Self {
        Self { column, row }
    }

    pub fn parse(reference: &str) -> Result<Self> {
        let split = reference
            .find(|c: char| !c.is_ascii_uppercase())
            .unwrap_or(reference.len());
        let (letters, digits) = reference.split_at(split);
        let invalid = || CountSheetError::InvalidCellRef(reference.to_string());

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let column = ColumnAddress::from_letters(letters).ok_or_else(invalid)?;
        let row = digits.parse::<u32>().map_err(|_| invalid())?;
        if row == 0 {
            return Err(invalid());
        }
        Ok(Self { column, row })
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.column, self.row)
    }
}
