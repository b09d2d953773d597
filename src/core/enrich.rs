//! Enrichment engine: joins catalog products against the mapping table on
//! their classification code.

use crate::domain::model::{
    classification_code, Catalog, EnrichReport, EnrichStats, MappingTable, ProductOutcome,
    RecordOutcome, PATTERN_FIELD,
};
use chrono::{DateTime, Utc};
use serde_json::Value;

/// Enrich `catalog` in place and stamp it with the current UTC time.
pub fn enrich(catalog: &mut Catalog, mapping: &MappingTable) -> EnrichReport {
    enrich_at(catalog, mapping, Utc::now())
}

/// Same as [`enrich`] with an explicit export time.
pub fn enrich_at(catalog: &mut Catalog, mapping: &MappingTable, now: DateTime<Utc>) -> EnrichReport {
    let mut stats = EnrichStats::default();
    let mut outcomes = Vec::with_capacity(catalog.products().len());

    for (product_id, product) in catalog.products_mut().iter_mut() {
        let outcome = enrich_product(product, mapping);
        match &outcome {
            RecordOutcome::Updated { .. } => stats.updated_count += 1,
            RecordOutcome::NotFound { .. } => stats.not_found_count += 1,
            // Reported, but counted by neither statistic.
            RecordOutcome::NoCode => {}
        }
        tracing::trace!(product_id = %product_id, ?outcome, "product processed");
        outcomes.push(ProductOutcome {
            product_id: product_id.clone(),
            outcome,
        });
    }

    let export_timestamp = format_timestamp(now);
    catalog.set_export_timestamp(export_timestamp.clone());

    EnrichReport {
        stats,
        outcomes,
        export_timestamp,
    }
}

fn enrich_product(product: &mut Value, mapping: &MappingTable) -> RecordOutcome {
    let lookup = match classification_code(product) {
        None => return RecordOutcome::NoCode,
        Some(Value::Null) => Err("null".to_string()),
        Some(Value::String(code)) => mapping
            .lookup(code)
            .map(str::to_string)
            .ok_or_else(|| code.clone()),
        Some(other) => {
            let code = other.to_string();
            mapping.lookup(&code).map(str::to_string).ok_or(code)
        }
    };

    match lookup {
        Ok(pattern) => {
            if let Some(record) = product.as_object_mut() {
                record.insert(PATTERN_FIELD.to_string(), Value::String(pattern.clone()));
            }
            RecordOutcome::Updated { pattern }
        }
        Err(code) => RecordOutcome::NotFound { code },
    }
}

/// ISO-8601 UTC with microseconds and a literal `Z`.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
}
