pub mod cli;
pub mod toml_config;

use crate::core::ConfigProvider;
use crate::domain::model::MappingFormat;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_delimiter, validate_non_empty_string, validate_path, validate_required_field,
    Validate,
};
use toml_config::TomlConfig;

#[cfg(feature = "cli")]
use clap::{Args, Parser, Subcommand};

#[cfg(feature = "cli")]
#[derive(Debug, Parser)]
#[command(name = "hatch-enrich")]
#[command(about = "Adds hatching patterns to a product catalog from a KBOB REF mapping table")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[cfg(feature = "cli")]
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Enrich a catalog with hatching patterns
    Enrich(CliConfig),
}

#[cfg_attr(feature = "cli", derive(Args))]
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Mapping table with 'KBOB REF' and 'Hatching Pattern' columns
    #[cfg_attr(feature = "cli", arg(long = "mapping", env = "HATCH_MAPPING_PATH"))]
    pub mapping_path: Option<String>,

    /// Catalog JSON to enrich
    #[cfg_attr(feature = "cli", arg(long = "input", env = "HATCH_INPUT_PATH"))]
    pub input_path: Option<String>,

    /// Destination catalog; defaults to the input (in-place update)
    #[cfg_attr(feature = "cli", arg(long = "output", env = "HATCH_OUTPUT_PATH"))]
    pub output_path: Option<String>,

    /// TOML run file; flags take precedence over its values
    #[cfg_attr(feature = "cli", arg(short, long))]
    pub config: Option<String>,

    /// Mapping file delimiter (default: tab for .tsv, comma otherwise)
    #[cfg_attr(feature = "cli", arg(long))]
    pub delimiter: Option<char>,

    #[cfg_attr(feature = "cli", arg(long))]
    pub code_column: Option<String>,

    #[cfg_attr(feature = "cli", arg(long))]
    pub pattern_column: Option<String>,

    #[cfg_attr(feature = "cli", arg(short, long, help = "Enable verbose output"))]
    pub verbose: bool,

    #[cfg_attr(feature = "cli", arg(long, help = "Log CPU and memory usage per phase"))]
    pub monitor: bool,

    #[cfg_attr(feature = "cli", arg(long, help = "Enrich and report without writing output"))]
    pub dry_run: bool,

    #[cfg_attr(feature = "cli", arg(long, help = "Emit logs as JSON"))]
    pub log_json: bool,
}

impl CliConfig {
    /// Merge flags over the optional run file and validate the result.
    pub fn resolve(&self) -> Result<RunConfig> {
        let file = match &self.config {
            Some(path) => {
                tracing::debug!("Loading run file from: {}", path);
                TomlConfig::from_file(path)?
            }
            None => TomlConfig::default(),
        };

        let mapping_path = self.mapping_path.clone().or(file.paths.mapping.clone());
        let input_path = self.input_path.clone().or(file.paths.input.clone());
        let output_path = self
            .output_path
            .clone()
            .or(file.paths.output.clone())
            .or_else(|| input_path.clone());

        let mut mapping_format = file.mapping_format()?;
        if let Some(column) = &self.code_column {
            mapping_format.code_column = column.clone();
        }
        if let Some(column) = &self.pattern_column {
            mapping_format.pattern_column = column.clone();
        }
        if let Some(delimiter) = self.delimiter {
            mapping_format.delimiter = Some(validate_delimiter("delimiter", delimiter)?);
        }

        let config = RunConfig {
            mapping_path: validate_required_field("mapping_path", &mapping_path)?.clone(),
            input_path: validate_required_field("input_path", &input_path)?.clone(),
            output_path: validate_required_field("output_path", &output_path)?.clone(),
            mapping_format,
            monitor: self.monitor || file.monitoring_enabled(),
            dry_run: self.dry_run,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub mapping_path: String,
    pub input_path: String,
    pub output_path: String,
    pub mapping_format: MappingFormat,
    pub monitor: bool,
    pub dry_run: bool,
}

impl Validate for RunConfig {
    fn validate(&self) -> Result<()> {
        validate_path("mapping_path", &self.mapping_path)?;
        validate_path("input_path", &self.input_path)?;
        validate_path("output_path", &self.output_path)?;
        validate_non_empty_string("code_column", &self.mapping_format.code_column)?;
        validate_non_empty_string("pattern_column", &self.mapping_format.pattern_column)?;
        Ok(())
    }
}

impl ConfigProvider for RunConfig {
    fn mapping_path(&self) -> &str {
        &self.mapping_path
    }

    fn input_path(&self) -> &str {
        &self.input_path
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn mapping_format(&self) -> MappingFormat {
        self.mapping_format.clone()
    }
}
