use crate::domain::model::MappingFormat;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::validate_delimiter;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Run file, e.g.
///
/// ```toml
/// [paths]
/// mapping = "${DATA_DIR}/KBOB_hatchingpattern_mapping.csv"
/// input = "${DATA_DIR}/kbob_2022_v5_mat.json"
///
/// [mapping]
/// delimiter = ";"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub mapping: MappingConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathsConfig {
    pub mapping: Option<String>,
    pub input: Option<String>,
    pub output: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MappingConfig {
    pub code_column: Option<String>,
    pub pattern_column: Option<String>,
    pub delimiter: Option<String>,
    pub na_values: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MonitoringConfig {
    pub enabled: bool,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| EtlError::ConfigValidationError {
                field: "config".to_string(),
                message: format!("cannot read {}: {}", path.display(), e),
            })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DATA_DIR})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn mapping_format(&self) -> Result<MappingFormat> {
        let mut format = MappingFormat::default();
        if let Some(column) = &self.mapping.code_column {
            format.code_column = column.clone();
        }
        if let Some(column) = &self.mapping.pattern_column {
            format.pattern_column = column.clone();
        }
        if let Some(delimiter) = &self.mapping.delimiter {
            let mut chars = delimiter.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => format.delimiter = Some(validate_delimiter("mapping.delimiter", c)?),
                _ => {
                    return Err(EtlError::InvalidConfigValueError {
                        field: "mapping.delimiter".to_string(),
                        value: delimiter.clone(),
                        reason: "Delimiter must be exactly one character".to_string(),
                    })
                }
            }
        }
        if let Some(na_values) = &self.mapping.na_values {
            format.na_values = na_values.clone();
        }
        Ok(format)
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_basic_toml_config() {
        let toml_content = r#"
[paths]
mapping = "data/KBOB_hatchingpattern_mapping.csv"
input = "data/kbob_2022_v5_mat.json"

[mapping]
delimiter = ";"
na_values = ["", "-"]

[monitoring]
enabled = true
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(
            config.paths.mapping.as_deref(),
            Some("data/KBOB_hatchingpattern_mapping.csv")
        );
        assert_eq!(config.paths.output, None);
        assert!(config.monitoring_enabled());

        let format = config.mapping_format().unwrap();
        assert_eq!(format.delimiter, Some(b';'));
        assert_eq!(format.code_column, "KBOB REF");
        assert!(format.is_na("-"));
        assert!(!format.is_na("NaN"));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert!(!config.monitoring_enabled());
        assert_eq!(config.mapping_format().unwrap(), MappingFormat::default());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("HATCH_TEST_DATA_DIR", "/srv/kbob");

        let toml_content = r#"
[paths]
input = "${HATCH_TEST_DATA_DIR}/catalog.json"
output = "${HATCH_TEST_UNSET_VAR}/catalog.json"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.paths.input.as_deref(), Some("/srv/kbob/catalog.json"));
        assert_eq!(
            config.paths.output.as_deref(),
            Some("${HATCH_TEST_UNSET_VAR}/catalog.json")
        );

        std::env::remove_var("HATCH_TEST_DATA_DIR");
    }

    #[test]
    fn test_invalid_delimiter() {
        let config = TomlConfig::from_toml_str("[mapping]\ndelimiter = \";;\"\n").unwrap();
        assert!(config.mapping_format().is_err());
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let result = TomlConfig::from_toml_str("[paths]\nmaping = \"typo.csv\"\n");
        assert!(matches!(result, Err(EtlError::ConfigValidationError { .. })));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[paths]\nmapping = \"m.csv\"\ninput = \"c.json\"\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.paths.input.as_deref(), Some("c.json"));
    }
}
