//! Mapping loader: reads the delimited reference file into a [`MappingTable`].

use crate::core::Storage;
use crate::domain::model::{MappingFormat, MappingRow, MappingTable};
use crate::utils::error::{EtlError, Result};
use csv::ReaderBuilder;

/// Load the mapping table from `path` through `storage`.
///
/// Rows keep file order, which decides which row wins for duplicated codes.
pub async fn load_mapping<S: Storage>(
    storage: &S,
    path: &str,
    format: &MappingFormat,
) -> Result<MappingTable> {
    let data = storage.read_file(path).await?;
    tracing::debug!("Read {} bytes of mapping data from {}", data.len(), path);

    let table = parse_mapping(path, &data, format)?;
    if table.is_empty() {
        tracing::warn!("Mapping file {} has no rows, no product will be updated", path);
    }
    tracing::info!(
        "Loaded {} mapping rows ({} distinct codes) from {}",
        table.len(),
        table.code_count(),
        path
    );
    Ok(table)
}

/// Parse delimited mapping data. `origin` names the source in errors and
/// selects the default delimiter by extension.
pub fn parse_mapping(origin: &str, data: &[u8], format: &MappingFormat) -> Result<MappingTable> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(format.delimiter_for(origin))
        .from_reader(data);

    let decode_error = |e: csv::Error| EtlError::SchemaError {
        path: origin.to_string(),
        message: format!("cannot decode mapping data: {}", e),
    };

    let headers: Vec<String> = reader
        .headers()
        .map_err(decode_error)?
        .iter()
        .map(|h| h.trim_matches('\u{feff}').trim().to_string())
        .collect();

    let column = |name: &str| headers.iter().position(|h| h == name);
    let (code_idx, pattern_idx) = match (
        column(format.code_column.as_str()),
        column(format.pattern_column.as_str()),
    ) {
        (Some(code_idx), Some(pattern_idx)) => (code_idx, pattern_idx),
        (code_idx, pattern_idx) => {
            let missing: Vec<&str> = [
                (code_idx, format.code_column.as_str()),
                (pattern_idx, format.pattern_column.as_str()),
            ]
            .into_iter()
            .filter(|(idx, _)| idx.is_none())
            .map(|(_, name)| name)
            .collect();

            return Err(EtlError::SchemaError {
                path: origin.to_string(),
                message: format!(
                    "missing required column(s): {} (found: {})",
                    missing.join(", "),
                    headers.join(", ")
                ),
            });
        }
    };

    let cell = |record: &csv::StringRecord, idx: usize| {
        record
            .get(idx)
            .filter(|value| !format.is_na(value))
            .map(str::to_string)
    };

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(decode_error)?;
        rows.push(MappingRow::new(
            cell(&record, code_idx),
            cell(&record, pattern_idx),
        ));
    }

    Ok(MappingTable::from_rows(rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(origin: &str, data: &str) -> Result<MappingTable> {
        parse_mapping(origin, data.as_bytes(), &MappingFormat::default())
    }

    #[test]
    fn test_rows_keep_file_order() {
        let table = parse(
            "mapping.csv",
            "KBOB REF,Hatching Pattern\nK01,hatch-a\nK02,\nK01,hatch-b\n",
        )
        .unwrap();

        let codes: Vec<Option<&str>> = table.rows().iter().map(|r| r.code()).collect();
        assert_eq!(codes, vec![Some("K01"), Some("K02"), Some("K01")]);
        assert_eq!(table.lookup("K01"), Some("hatch-a"));
        assert_eq!(table.lookup("K02"), None);
    }

    #[test]
    fn test_extra_columns_and_column_order() {
        let table = parse(
            "mapping.csv",
            "Name,Hatching Pattern,KBOB REF\nConcrete,concrete-dots,01.002\n",
        )
        .unwrap();
        assert_eq!(table.lookup("01.002"), Some("concrete-dots"));
    }

    #[test]
    fn test_missing_columns_is_schema_error() {
        let err = parse("mapping.csv", "KBOB REF,Pattern\nK01,x\n").unwrap_err();
        match err {
            EtlError::SchemaError { path, message } => {
                assert_eq!(path, "mapping.csv");
                assert!(message.starts_with("missing required column(s): Hatching Pattern ("));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_empty_file_is_schema_error() {
        let err = parse("mapping.csv", "").unwrap_err();
        assert!(matches!(err, EtlError::SchemaError { .. }));
    }

    #[test]
    fn test_header_only_file_is_empty_table() {
        let table = parse("mapping.csv", "KBOB REF,Hatching Pattern\n").unwrap();
        assert!(table.is_empty());
        assert_eq!(table.lookup("K01"), None);
    }

    #[test]
    fn test_invalid_utf8_is_schema_error_with_path() {
        let mut data = b"KBOB REF,Hatching Pattern\nK01,".to_vec();
        data.extend_from_slice(&[0xff, 0xfe, b'\n']);

        let err = parse_mapping("mapping.csv", &data, &MappingFormat::default()).unwrap_err();
        match err {
            EtlError::SchemaError { path, message } => {
                assert_eq!(path, "mapping.csv");
                assert!(message.starts_with("cannot decode mapping data"));
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let err = parse_mapping("mapping.csv", &[0xff, b',', b'x', b'\n'], &MappingFormat::default())
            .unwrap_err();
        assert!(matches!(err, EtlError::SchemaError { .. }));
    }

    #[test]
    fn test_header_bom_and_padding() {
        let table = parse(
            "mapping.csv",
            "\u{feff} KBOB REF , Hatching Pattern\nK01,hatch-a\n",
        )
        .unwrap();
        assert_eq!(table.lookup("K01"), Some("hatch-a"));
    }

    #[test]
    fn test_cells_are_not_trimmed() {
        let table = parse("mapping.csv", "KBOB REF,Hatching Pattern\n K01 ,hatch-a\n").unwrap();
        assert_eq!(table.lookup("K01"), None);
        assert_eq!(table.lookup(" K01 "), Some("hatch-a"));
    }

    #[test]
    fn test_na_markers_are_missing() {
        let table = parse(
            "mapping.csv",
            "KBOB REF,Hatching Pattern\nK01,NaN\nK02,N/A\nNA,hatch-x\nK03,hatch-c\n",
        )
        .unwrap();
        assert_eq!(table.lookup("K01"), None);
        assert_eq!(table.lookup("K02"), None);
        assert_eq!(table.lookup("NA"), None);
        assert_eq!(table.lookup("K03"), Some("hatch-c"));
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn test_ragged_rows_are_tolerated() {
        let table = parse("mapping.csv", "KBOB REF,Hatching Pattern\nK01\nK02,hatch-b\n").unwrap();
        assert_eq!(table.lookup("K01"), None);
        assert_eq!(table.lookup("K02"), Some("hatch-b"));
    }

    #[test]
    fn test_tsv_extension_selects_tab() {
        let table = parse(
            "mapping.tsv",
            "KBOB REF\tHatching Pattern\nK01\thatch, with comma\n",
        )
        .unwrap();
        assert_eq!(table.lookup("K01"), Some("hatch, with comma"));
    }

    #[test]
    fn test_custom_format() {
        let format = MappingFormat {
            code_column: "code".to_string(),
            pattern_column: "pattern".to_string(),
            delimiter: Some(b';'),
            na_values: vec![String::new()],
        };
        let table = parse_mapping("ref.txt", b"code;pattern\nNA;stone\n", &format).unwrap();
        assert_eq!(table.lookup("NA"), Some("stone"));
    }
}
