use crate::bridge::KlineDataCollector;
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};

/// Kline synchronization job
///
/// Periodically refreshes the kline store by re-collecting candles for every
/// trading pair through the exchange aggregator.
pub struct KlineSyncJob {
    collector: Arc<KlineDataCollector>,
    cron_expression: String,
}

impl KlineSyncJob {
    /// Create a new kline sync job with the given cron schedule
    pub fn new(collector: Arc<KlineDataCollector>, cron_expression: String) -> Self {
        Self {
            collector,
            cron_expression,
        }
    }

    /// Register this job with the scheduler
    pub async fn register(
        self,
        scheduler: &JobScheduler,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let collector = self.collector.clone();
        let schedule = self.cron_expression.clone();

        let job = Job::new_async(schedule.as_str(), move |_uuid, _lock| {
            let collector = collector.clone();

            Box::pin(async move {
                tracing::info!("Starting scheduled kline synchronization");
                match collector.update_entire_kline_data().await {
                    Ok(count) => {
                        tracing::info!("Kline synchronization completed: {} klines stored", count);
                    }
                    Err(e) => {
                        tracing::error!("Kline synchronization failed: {}", e);
                    }
                }
            })
        })?;

        scheduler.add(job).await?;

        tracing::info!("Kline sync job registered (schedule: {})", self.cron_expression);

        Ok(())
    }

    /// Run the synchronization immediately (manual trigger)
    pub async fn run_now(&self) -> Result<usize, Box<dyn std::error::Error>> {
        Ok(self.collector.update_entire_kline_data().await?)
    }
}
