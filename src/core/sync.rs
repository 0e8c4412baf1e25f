use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct SyncEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> SyncEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("Starting blocklist sync...");

        tracing::info!("Downloading blocklists...");
        let raw_lists = self.pipeline.extract().await?;
        tracing::info!("Downloaded {} lists", raw_lists.len());
        self.monitor.log_stats("Extract");

        tracing::info!("Parsing and deduplicating domains...");
        let plan = self.pipeline.transform(raw_lists).await?;
        tracing::info!("{} unique domains to sync", plan.unique_count());
        self.monitor.log_stats("Transform");

        tracing::info!("Applying changes to Cloudflare Gateway...");
        let summary = self.pipeline.load(plan).await?;
        self.monitor.log_stats("Load");

        self.monitor.log_final_stats();
        Ok(summary)
    }
}
