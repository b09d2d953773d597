use crate::utils::error::{EtlError, Result};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;

pub const PRODUCTS_KEY: &str = "products";
pub const TIMESTAMP_KEY: &str = "exportTimestamp";
pub const ATTRIBUTES_KEY: &str = "attributes";
pub const CODE_ATTRIBUTE: &str = "KBOB REF";
pub const PATTERN_FIELD: &str = "hatchingPattern";

pub const DEFAULT_CODE_COLUMN: &str = "KBOB REF";
pub const DEFAULT_PATTERN_COLUMN: &str = "Hatching Pattern";

/// Cell values read as missing, matching the usual spreadsheet export tokens.
pub const DEFAULT_NA_VALUES: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// How to read the mapping file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingFormat {
    pub code_column: String,
    pub pattern_column: String,
    /// `None` picks tab for `.tsv` files and comma otherwise.
    pub delimiter: Option<u8>,
    pub na_values: Vec<String>,
}

impl Default for MappingFormat {
    fn default() -> Self {
        Self {
            code_column: DEFAULT_CODE_COLUMN.to_string(),
            pattern_column: DEFAULT_PATTERN_COLUMN.to_string(),
            delimiter: None,
            na_values: DEFAULT_NA_VALUES.iter().map(|v| v.to_string()).collect(),
        }
    }
}

impl MappingFormat {
    pub fn delimiter_for(&self, path: &str) -> u8 {
        if let Some(delimiter) = self.delimiter {
            return delimiter;
        }
        let is_tsv = std::path::Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("tsv"));
        if is_tsv {
            b'\t'
        } else {
            b','
        }
    }

    pub fn is_na(&self, cell: &str) -> bool {
        self.na_values.iter().any(|na| na == cell)
    }
}

/// One row of the reference table.
///
/// `pattern` is `None` for blank or missing cells, so "no row" and "row without
/// a pattern" resolve to the same lookup result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingRow {
    code: Option<String>,
    pattern: Option<String>,
}

impl MappingRow {
    pub fn new(code: Option<String>, pattern: Option<String>) -> Self {
        Self {
            code,
            // Whitespace-only patterns count as blank and never overwrite a product.
            pattern: pattern.filter(|p| !p.trim().is_empty()),
        }
    }

    /// `None` when the code cell was missing; such a row never matches.
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    pub fn pattern(&self) -> Option<&str> {
        self.pattern.as_deref()
    }
}

/// Read-only code -> pattern table. The first row carrying a code is
/// authoritative for that code, even when its pattern is blank.
#[derive(Debug, Clone, Default)]
pub struct MappingTable {
    rows: Vec<MappingRow>,
    first_by_code: HashMap<String, usize>,
}

impl MappingTable {
    pub fn from_rows(rows: Vec<MappingRow>) -> Self {
        let mut first_by_code = HashMap::with_capacity(rows.len());
        for (idx, row) in rows.iter().enumerate() {
            if let Some(code) = row.code() {
                first_by_code.entry(code.to_string()).or_insert(idx);
            }
        }
        Self {
            rows,
            first_by_code,
        }
    }

    pub fn from_pairs<I, C, P>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (C, P)>,
        C: Into<String>,
        P: Into<String>,
    {
        Self::from_rows(
            pairs
                .into_iter()
                .map(|(code, pattern)| MappingRow::new(Some(code.into()), Some(pattern.into())))
                .collect(),
        )
    }

    /// Exact, case-sensitive match on the first row with this code.
    pub fn lookup(&self, code: &str) -> Option<&str> {
        self.first_by_code
            .get(code)
            .and_then(|&idx| self.rows[idx].pattern())
    }

    pub fn rows(&self) -> &[MappingRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of distinct codes that can be looked up.
    pub fn code_count(&self) -> usize {
        self.first_by_code.len()
    }
}

/// The product catalog document.
///
/// Top-level key order is kept as read; `products` is held apart so it can be
/// mutated without re-validating the document shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    document: Map<String, Value>,
    products: Map<String, Value>,
}

impl Catalog {
    /// Parse catalog bytes. `origin` names the source in error messages.
    pub fn from_slice(origin: &str, bytes: &[u8]) -> Result<Self> {
        let value: Value =
            serde_json::from_slice(bytes).map_err(|source| EtlError::MalformedCatalog {
                path: origin.to_string(),
                source,
            })?;
        Self::from_value(origin, value)
    }

    pub fn from_value(origin: &str, value: Value) -> Result<Self> {
        let Value::Object(mut document) = value else {
            return Err(EtlError::SchemaError {
                path: origin.to_string(),
                message: "top-level value must be a JSON object".to_string(),
            });
        };

        // Replaced by a placeholder so the key keeps its position.
        let products = match document.insert(PRODUCTS_KEY.to_string(), Value::Null) {
            Some(Value::Object(products)) => products,
            Some(_) => {
                return Err(EtlError::SchemaError {
                    path: origin.to_string(),
                    message: format!("'{}' must be a JSON object", PRODUCTS_KEY),
                })
            }
            None => {
                return Err(EtlError::SchemaError {
                    path: origin.to_string(),
                    message: format!("missing top-level '{}' field", PRODUCTS_KEY),
                })
            }
        };

        Ok(Self { document, products })
    }

    pub fn products(&self) -> &Map<String, Value> {
        &self.products
    }

    pub fn products_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.products
    }

    pub fn product(&self, id: &str) -> Option<&Value> {
        self.products.get(id)
    }

    pub fn export_timestamp(&self) -> Option<&str> {
        self.document.get(TIMESTAMP_KEY).and_then(Value::as_str)
    }

    pub fn set_export_timestamp(&mut self, timestamp: String) {
        self.document
            .insert(TIMESTAMP_KEY.to_string(), Value::String(timestamp));
    }

    /// Pretty-printed JSON, two-space indent, non-ASCII kept literally.
    pub fn to_pretty_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }
}

impl Serialize for Catalog {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.document.len()))?;
        for (key, value) in &self.document {
            if key == PRODUCTS_KEY {
                map.serialize_entry(key, &self.products)?;
            } else {
                map.serialize_entry(key, value)?;
            }
        }
        map.end()
    }
}

/// The classification code attribute of a product record, if it has one.
pub fn classification_code(product: &Value) -> Option<&Value> {
    product.get(ATTRIBUTES_KEY)?.as_object()?.get(CODE_ATTRIBUTE)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EnrichStats {
    pub updated_count: usize,
    pub not_found_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    Updated { pattern: String },
    NotFound { code: String },
    NoCode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductOutcome {
    pub product_id: String,
    pub outcome: RecordOutcome,
}

impl fmt::Display for ProductOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            RecordOutcome::Updated { pattern } => {
                write!(f, "Updated {}: {}", self.product_id, pattern)
            }
            RecordOutcome::NotFound { code } => write!(
                f,
                "No hatching pattern found for {} ({}: {})",
                self.product_id, CODE_ATTRIBUTE, code
            ),
            RecordOutcome::NoCode => {
                write!(f, "No {} found for {}", CODE_ATTRIBUTE, self.product_id)
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct EnrichReport {
    pub stats: EnrichStats,
    /// One entry per product, in catalog order.
    pub outcomes: Vec<ProductOutcome>,
    pub export_timestamp: String,
}

impl EnrichReport {
    pub fn skipped_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.outcome == RecordOutcome::NoCode)
            .count()
    }
}

/// Inputs gathered by a pipeline's extract step.
#[derive(Debug, Clone)]
pub struct ExtractResult {
    pub mapping: MappingTable,
    pub catalog: Catalog,
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub catalog: Catalog,
    pub report: EnrichReport,
}
