pub mod enrich;
pub mod etl;
pub mod mapping;
pub mod pipeline;

pub use crate::domain::model::{
    Catalog, EnrichReport, EnrichStats, ExtractResult, MappingFormat, MappingRow, MappingTable,
    ProductOutcome, RecordOutcome, TransformResult,
};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
