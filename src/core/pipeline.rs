use crate::core::enrich::enrich;
use crate::core::mapping::load_mapping;
use crate::core::{Catalog, ConfigProvider, ExtractResult, Pipeline, Storage, TransformResult};
use crate::utils::error::Result;

/// Reads the mapping and catalog through `storage`, enriches the catalog and
/// writes it back to the configured output path.
pub struct HatchingPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> HatchingPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for HatchingPipeline<S, C> {
    async fn extract(&self) -> Result<ExtractResult> {
        let mapping = load_mapping(
            &self.storage,
            self.config.mapping_path(),
            &self.config.mapping_format(),
        )
        .await?;

        let input_path = self.config.input_path();
        tracing::debug!("Reading catalog from: {}", input_path);
        let data = self.storage.read_file(input_path).await?;
        let catalog = Catalog::from_slice(input_path, &data)?;
        tracing::info!(
            "Loaded catalog with {} products from {}",
            catalog.products().len(),
            input_path
        );

        Ok(ExtractResult { mapping, catalog })
    }

    async fn transform(&self, input: ExtractResult) -> Result<TransformResult> {
        let ExtractResult {
            mapping,
            mut catalog,
        } = input;

        let report = enrich(&mut catalog, &mapping);
        tracing::debug!(
            "Enriched catalog: {} updated, {} not found, {} without code",
            report.stats.updated_count,
            report.stats.not_found_count,
            report.skipped_count()
        );

        Ok(TransformResult { catalog, report })
    }

    async fn load(&self, result: &TransformResult) -> Result<String> {
        let output_path = self.config.output_path();
        let data = result.catalog.to_pretty_json()?;

        tracing::debug!("Writing catalog ({} bytes) to {}", data.len(), output_path);
        self.storage.write_file(output_path, &data).await?;

        Ok(output_path.to_string())
    }

    fn output_target(&self) -> &str {
        self.config.output_path()
    }
}
