use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use crate::domain::repository::ProviderRepository;

/// §4.3: priority decays hourly back toward the baseline, and every metric
/// resets once a day so a provider's bad night doesn't follow it forever.
pub struct ProviderMetricsJob {
    provider_repo: Arc<dyn ProviderRepository>,
}

impl ProviderMetricsJob {
    pub fn new(provider_repo: Arc<dyn ProviderRepository>) -> Self {
        Self { provider_repo }
    }

    pub async fn decay_tick(&self) {
        if let Err(e) = self.provider_repo.decay_all().await {
            error!(error = %e, "provider priority decay failed");
        } else {
            info!("provider priority decay complete");
        }
    }

    pub async fn daily_reset_tick(&self) {
        if let Err(e) = self.provider_repo.reset_daily_all().await {
            error!(error = %e, "provider daily metrics reset failed");
        } else {
            info!("provider daily metrics reset complete");
        }
    }
}

pub fn spawn_decay_loop(job: Arc<ProviderMetricsJob>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60 * 60));
        loop {
            interval.tick().await;
            job.decay_tick().await;
        }
    });
}

pub fn spawn_daily_reset_loop(job: Arc<ProviderMetricsJob>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(24 * 60 * 60));
        loop {
            interval.tick().await;
            job.daily_reset_tick().await;
        }
    });
}
