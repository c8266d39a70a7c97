use crate::core::{LoadSummary, Pipeline, Records};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    pub async fn run(&self) -> Result<LoadSummary> {
        let name = self.pipeline.name();
        tracing::info!("Starting ETL process: {}", name);
        self.monitor.log_stats("Start");

        // Extract
        let raw_data = self.pipeline.extract().await?;
        let extracted = raw_data.record_count();
        tracing::info!("{}: extracted {} records", name, extracted);
        self.monitor.log_stats("Extract");

        // Transform
        let transformed_data = self.pipeline.transform(raw_data).await?;
        let transformed = transformed_data.record_count();
        tracing::info!("{}: transformed {} records", name, transformed);
        self.monitor.log_stats("Transform");

        // Load
        let mut summary = self.pipeline.load(transformed_data).await?;
        summary.pipeline = name.to_string();
        summary.extracted = extracted;
        summary.transformed = transformed;
        tracing::info!(
            "{}: loaded {} rows, skipped {}",
            name,
            summary.loaded,
            summary.skipped
        );
        self.monitor.log_stats("Load");
        self.monitor.log_final_stats();

        Ok(summary)
    }
}
