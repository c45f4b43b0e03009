use crate::core::{Pipeline, RunSummary};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct AnalysisEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> AnalysisEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    /// Runs extract → transform → load. A failed extract stops the run
    /// before anything is written.
    pub fn run(&mut self) -> Result<RunSummary> {
        tracing::info!("🚀 Starting sales analysis...");

        // Extract
        let extracted = match self.pipeline.extract() {
            Ok(extracted) => extracted,
            Err(e) => {
                tracing::error!("❌ Error loading data: {}", e);
                return Err(e);
            }
        };
        self.monitor.log_stage("Extract");

        // Transform
        let analysis = self.pipeline.transform(extracted)?;
        tracing::info!(
            "Cleaned {} records across {} states",
            analysis.sales.len(),
            analysis.aggregates.state_wise.len()
        );
        self.monitor.log_stage("Transform");

        // Load
        let summary = self.pipeline.load(&analysis)?;
        self.monitor.log_stage("Load");
        self.monitor.log_final_stats();

        Ok(summary)
    }
}
