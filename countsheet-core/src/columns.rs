//! Header row resolution: label text to canonical field and physical column

use crate::address::ColumnAddress;
use crate::error::{CountSheetError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Canonical fields a count template may carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Description,
    DistributorId,
    CustomerId,
    Quantity,
    UnitOfMeasure,
    Location,
    Area,
    Place,
}

impl Field {
    pub const ALL: [Field; 8] = [
        Field::Description,
        Field::DistributorId,
        Field::CustomerId,
        Field::Quantity,
        Field::UnitOfMeasure,
        Field::Location,
        Field::Area,
        Field::Place,
    ];

    /// Fields whose absence from the header row aborts parsing
    pub const REQUIRED: [Field; 3] = [Field::Description, Field::DistributorId, Field::Quantity];

    pub fn canonical_name(&self) -> &'static str {
        match self {
            Field::Description => "description",
            Field::DistributorId => "distributor_id",
            Field::CustomerId => "customer_id",
            Field::Quantity => "quantity",
            Field::UnitOfMeasure => "unit_of_measure",
            Field::Location => "location",
            Field::Area => "area",
            Field::Place => "place",
        }
    }

    pub fn from_canonical_name(name: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|f| f.canonical_name() == name)
    }

    /// Header labels recognized for this field out of the box
    pub fn builtin_labels(&self) -> &'static [&'static str] {
        match self {
            Field::Description => &["Item Description"],
            Field::DistributorId => &["Dist #", "Dist # *"],
            Field::CustomerId => &["Cust #", "Cust # *"],
            Field::Quantity => &["Quantity"],
            Field::UnitOfMeasure => &["UOM"],
            Field::Location => &["Location"],
            Field::Area => &["Area"],
            Field::Place => &["Place"],
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical_name())
    }
}

/// Exact-text lookup from header label to field.
///
/// Matching is case and decoration sensitive: "Dist # *" only matches because
/// it is listed as a variant.
#[derive(Debug, Clone)]
pub struct HeaderLabels {
    labels: HashMap<String, Field>,
}

impl HeaderLabels {
    pub fn builtin() -> Self {
        let labels = Field::ALL
            .iter()
            .flat_map(|field| {
                field
                    .builtin_labels()
                    .iter()
                    .map(move |label| (label.to_string(), *field))
            })
            .collect();
        Self { labels }
    }

    /// Built-in labels plus the extra variants keyed by canonical field name
    pub fn with_extra(extra: &BTreeMap<String, Vec<String>>) -> Result<Self> {
        let mut labels = Self::builtin();
        for (name, variants) in extra {
            let field = Field::from_canonical_name(name).ok_or_else(|| {
                CountSheetError::InvalidConfig(format!("unknown field '{}' in [labels]", name))
            })?;
            for variant in variants {
                labels.labels.entry(variant.clone()).or_insert(field);
            }
        }
        Ok(labels)
    }

    pub fn lookup(&self, label: &str) -> Option<Field> {
        self.labels.get(label).copied()
    }
}

impl Default for HeaderLabels {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Canonical field to physical column, built once from the header row
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldMap {
    columns: BTreeMap<Field, ColumnAddress>,
}

impl FieldMap {
    pub fn get(&self, field: Field) -> Option<ColumnAddress> {
        self.columns.get(&field).copied()
    }

    pub fn contains(&self, field: Field) -> bool {
        self.columns.contains_key(&field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, ColumnAddress)> + '_ {
        self.columns.iter().map(|(f, c)| (*f, *c))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Resolve the header row into a `FieldMap`.
///
/// `header` holds each present header cell with its own physical column, in
/// document order. Unknown labels are ignored; the leftmost column wins when a
/// field appears twice. Fails with the exact list of missing required fields.
pub fn resolve_columns<S: AsRef<str>>(
    header: &[(ColumnAddress, S)],
    labels: &HeaderLabels,
) -> Result<FieldMap> {
    let mut columns = BTreeMap::new();
    for (column, text) in header {
        if let Some(field) = labels.lookup(text.as_ref()) {
            columns.entry(field).or_insert(*column);
        }
    }

    let missing: Vec<Field> = Field::REQUIRED
        .into_iter()
        .filter(|field| !columns.contains_key(field))
        .collect();
    if !missing.is_empty() {
        return Err(CountSheetError::MissingColumns(missing));
    }

    Ok(FieldMap { columns })
}
