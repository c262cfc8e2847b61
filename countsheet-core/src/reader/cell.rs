//! Raw worksheet cells and their literal text

use crate::address::ColumnAddress;

/// A cell as it appears in worksheet markup, before string resolution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawCell {
    pub column: ColumnAddress,
    /// Value of the `t` attribute (`s`, `inlineStr`, `str`, `b`, ...)
    pub cell_type: Option<String>,
    /// Text of the `<v>` element
    pub value: Option<String>,
    /// Concatenated `<t>` runs of an `<is>` element
    pub inline: Option<String>,
}

impl RawCell {
    pub fn is_shared_string(&self) -> bool {
        self.cell_type.as_deref() == Some("s")
    }
}

/// Turns a raw cell into its literal text.
///
/// Order: inline string verbatim, then shared-string lookup for cells typed
/// `s` whose value is a valid index, then the raw value unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct CellValueResolver<'a> {
    shared_strings: Option<&'a [String]>,
}

impl<'a> CellValueResolver<'a> {
    pub fn new(shared_strings: Option<&'a [String]>) -> Self {
        Self { shared_strings }
    }

    pub fn resolve(&self, cell: &RawCell) -> String {
        if let Some(inline) = &cell.inline {
            return inline.clone();
        }

        let raw = cell.value.as_deref().unwrap_or_default();
        if cell.is_shared_string()
            && let Some(table) = self.shared_strings
            && let Some(entry) = raw
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(|idx| table.get(idx))
        {
            return entry.clone();
        }

        raw.to_string()
    }
}
