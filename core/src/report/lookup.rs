//! Static requirement metadata joined onto the validator report.

use polars::{
    frame::DataFrame,
    io::SerReader,
    prelude::{CsvReadOptions, CsvReader},
};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fs, io::Cursor, path::Path};

use crate::prelude::{CoreError, CoreResult};

const ID_COLUMN: &str = "ID";
const CATEGORY_COLUMN: &str = "Category";
const REQUIREMENT_COLUMN: &str = "Requirement";
const URL_COLUMN: &str = "URL";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LookupEntry {
    pub category: String,
    pub requirement: String,
    pub url: String,
}

/// Requirement id -> descriptive metadata. Never mutated after loading.
#[derive(Debug, Clone, Default)]
pub struct RequirementLookup {
    entries: HashMap<String, LookupEntry>,
}

impl RequirementLookup {
    pub fn load(path: &Path) -> CoreResult<Self> {
        let bytes = fs::read(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                CoreError::LookupMissing(path.to_path_buf())
            } else {
                CoreError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        Self::from_csv_bytes(bytes)
    }

    pub fn from_csv_str(text: &str) -> CoreResult<Self> {
        Self::from_csv_bytes(text.as_bytes().to_vec())
    }

    fn from_csv_bytes(bytes: Vec<u8>) -> CoreResult<Self> {
        // Every column is read as text so ids keep their exact spelling.
        let options = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(0));
        let df = CsvReader::new(Cursor::new(bytes))
            .with_options(options)
            .finish()
            .map_err(|e| CoreError::Lookup(e.to_string()))?;
        Self::from_frame(&df)
    }

    fn from_frame(df: &DataFrame) -> CoreResult<Self> {
        let ids = column_values(df, ID_COLUMN)?
            .ok_or_else(|| CoreError::Lookup(format!("missing `{ID_COLUMN}` column")))?;
        let optional = |name: &str| -> CoreResult<Vec<String>> {
            Ok(column_values(df, name)?.unwrap_or_else(|| vec![String::new(); ids.len()]))
        };
        let categories = optional(CATEGORY_COLUMN)?;
        let requirements = optional(REQUIREMENT_COLUMN)?;
        let urls = optional(URL_COLUMN)?;

        let mut entries = HashMap::with_capacity(ids.len());
        for (row, id) in ids.iter().enumerate() {
            if id.is_empty() {
                continue;
            }
            // First occurrence wins so the join never multiplies report rows.
            entries.entry(id.clone()).or_insert_with(|| LookupEntry {
                category: categories[row].clone(),
                requirement: requirements[row].clone(),
                url: urls[row].clone(),
            });
        }
        Ok(Self { entries })
    }

    pub fn get(&self, id: &str) -> Option<&LookupEntry> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, LookupEntry)> for RequirementLookup {
    fn from_iter<I: IntoIterator<Item = (String, LookupEntry)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

fn column_values(df: &DataFrame, name: &str) -> CoreResult<Option<Vec<String>>> {
    let Ok(column) = df.column(name) else {
        return Ok(None);
    };
    let values = column
        .str()
        .map_err(|e| CoreError::Lookup(format!("column `{name}`: {e}")))?;
    Ok(Some(
        values
            .into_iter()
            .map(|v| v.unwrap_or_default().trim().to_string())
            .collect(),
    ))
}

/// Loads the table, degrading to `None` plus a warning when it is absent or unreadable.
pub fn load_lookup_or_warn(path: &Path) -> (Option<RequirementLookup>, Option<String>) {
    match RequirementLookup::load(path) {
        Ok(lookup) => (Some(lookup), None),
        Err(CoreError::LookupMissing(path)) => (
            None,
            Some(format!(
                "lookup table {} not found; showing report columns only",
                path.display()
            )),
        ),
        Err(err) => (None, Some(format!("lookup table unusable ({err}); showing report columns only"))),
    }
}
