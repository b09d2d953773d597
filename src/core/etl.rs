use crate::core::{EnrichStats, Pipeline};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

/// What a finished run reports back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub stats: EnrichStats,
    pub output_path: String,
    /// `false` for dry runs.
    pub written: bool,
}

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
    dry_run: bool,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
            dry_run: false,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Extract, enrich, then write. Per-product lines and the summary go to
    /// stdout; nothing is written if any step before the write fails.
    pub async fn run(&self) -> Result<RunSummary> {
        tracing::info!("Starting hatching pattern enrichment");
        self.monitor.log_stats("Start");

        let extracted = self.pipeline.extract().await?;
        self.monitor.log_stats("Extract");

        let result = self.pipeline.transform(extracted).await?;
        self.monitor.log_stats("Transform");

        for outcome in &result.report.outcomes {
            println!("{}", outcome);
        }

        let stats = result.report.stats;
        let (output_path, written) = if self.dry_run {
            let target = self.pipeline.output_target();
            tracing::info!("Dry run, skipping write to {}", target);
            (target.to_string(), false)
        } else {
            let path = self.pipeline.load(&result).await?;
            self.monitor.log_stats("Load");
            (path, true)
        };

        println!();
        println!("Enrichment completed!");
        println!("Updated {} products with hatching patterns", stats.updated_count);
        println!(
            "Could not find hatching patterns for {} products",
            stats.not_found_count
        );
        if written {
            println!("Output saved to: {}", output_path);
        } else {
            println!("Dry run: output not written to {}", output_path);
        }

        tracing::info!(
            updated = stats.updated_count,
            not_found = stats.not_found_count,
            export_timestamp = %result.report.export_timestamp,
            "Enrichment finished"
        );
        self.monitor.log_final_stats();

        Ok(RunSummary {
            stats,
            output_path,
            written,
        })
    }
}
