pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use config::{cli::LocalStorage, CliConfig, RunConfig};
pub use core::{
    enrich::enrich,
    etl::{EtlEngine, RunSummary},
    mapping::load_mapping,
    pipeline::HatchingPipeline,
};
pub use domain::model::{Catalog, EnrichReport, EnrichStats, MappingFormat, MappingTable};
pub use utils::error::{EtlError, Result};
