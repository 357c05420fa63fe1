//! Load driver: spawns simulated users, aggregates what they report and
//! produces the final report.

use crate::client::RedfishClient;
use crate::config::LoadConfig;
use crate::error::LoadResult;
use crate::metrics::{LoadMetrics, LoadReport};
use crate::outcome::RequestRecord;
use crate::task::TaskSet;
use crate::user::{SimulatedUser, WaitTime};
use chrono::Utc;
use log::{info, warn};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::sleep;

pub struct LoadRunner {
    config: LoadConfig,
    tasks: Arc<TaskSet>,
}

impl LoadRunner {
    pub fn new(config: LoadConfig) -> LoadResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            tasks: Arc::new(TaskSet::openbmc_profile()),
        })
    }

    /// Replace the default OpenBMC task profile
    pub fn with_tasks(mut self, tasks: TaskSet) -> Self {
        self.tasks = Arc::new(tasks);
        self
    }

    pub fn config(&self) -> &LoadConfig {
        &self.config
    }

    /// Run for the configured run time
    pub async fn run(&self) -> LoadResult<LoadReport> {
        self.run_until(sleep(self.config.load.run_time())).await
    }

    /// Run for the configured run time, or until Ctrl-C
    pub async fn run_until_interrupted(&self) -> LoadResult<LoadReport> {
        let run_time = self.config.load.run_time();
        self.run_until(async move {
            tokio::select! {
                _ = sleep(run_time) => {}
                result = tokio::signal::ctrl_c() => {
                    match result {
                        Ok(()) => warn!("Interrupted, stopping users early"),
                        // No signal handler: fall back to the run time
                        Err(e) => {
                            warn!("Cannot listen for Ctrl-C: {}", e);
                            sleep(run_time).await;
                        }
                    }
                }
            }
        })
        .await
    }

    /// Spawn users at the configured rate and keep them running until `stop`
    /// completes, then abort them and build the report.
    pub async fn run_until<F>(&self, stop: F) -> LoadResult<LoadReport>
    where
        F: Future<Output = ()>,
    {
        let client = RedfishClient::new(&self.config.target)?;
        let profile = &self.config.load;
        let wait = WaitTime::from_profile(profile)?;

        info!(
            "Starting load test against {}: {} users at {}/s for {:?}",
            client.base_url(),
            profile.users,
            profile.spawn_rate,
            profile.run_time()
        );

        let (sink, records) = mpsc::unbounded_channel();
        let aggregator = Self::start_aggregator(records);

        let started = Instant::now();
        let started_at = Utc::now();
        let mut users = JoinSet::new();
        let mut spawned: u32 = 0;

        {
            let spawn_users = async {
                for id in 0..profile.users {
                    let user = SimulatedUser::new(
                        id,
                        client.clone(),
                        self.config.credentials.clone(),
                        self.tasks.clone(),
                        wait,
                        profile.seed,
                    );
                    users.spawn(user.run(sink.clone()));
                    spawned += 1;

                    if id + 1 < profile.users {
                        sleep(profile.spawn_interval()).await;
                    }
                }
                info!("All {} users spawned", profile.users);
                std::future::pending::<()>().await
            };

            tokio::select! {
                _ = stop => {}
                _ = spawn_users => {}
            }
        }

        users.abort_all();
        while users.join_next().await.is_some() {}
        drop(sink);

        let metrics = aggregator.await?;
        let duration = started.elapsed();
        info!(
            "Load test finished after {:?}: {} requests, {} failures",
            duration,
            metrics.total_requests(),
            metrics.total_failures()
        );

        Ok(LoadReport::new(
            client.base_url(),
            started_at,
            spawned,
            &metrics,
            duration,
        ))
    }

    fn start_aggregator(
        mut records: mpsc::UnboundedReceiver<RequestRecord>,
    ) -> JoinHandle<LoadMetrics> {
        tokio::spawn(async move {
            let mut metrics = LoadMetrics::new();
            while let Some(record) = records.recv().await {
                metrics.record(&record);
            }
            metrics
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoadError;

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = LoadConfig::default();
        config.load.users = 0;

        let result = LoadRunner::new(config);
        assert!(matches!(result, Err(LoadError::Config(_))));
    }

    #[tokio::test]
    async fn test_unreachable_target_reports_transport_failures() {
        let mut config = LoadConfig::default();
        // Port 9 (discard) on loopback: connection refused
        config.target.host = "http://127.0.0.1:9".to_string();
        config.target.request_timeout_secs = 1.0;
        config.load.users = 2;
        config.load.spawn_rate = 100.0;
        config.load.wait_min_secs = 0.01;
        config.load.wait_max_secs = 0.02;

        let runner = LoadRunner::new(config).unwrap();
        let report = runner
            .run_until(sleep(std::time::Duration::from_millis(300)))
            .await
            .unwrap();

        assert_eq!(report.users, 2);
        assert!(report.total_requests > 0);
        assert_eq!(report.total_requests, report.total_failures);
        let session = report.endpoint("Create Session").unwrap();
        assert_eq!(session.requests, 2);
        assert!(
            session
                .failure_reasons
                .keys()
                .all(|reason| reason.starts_with("transport error"))
        );
    }
}
