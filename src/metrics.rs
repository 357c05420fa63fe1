//! Aggregation of request records into per-endpoint statistics and reports

use crate::error::LoadResult;
use crate::outcome::{Outcome, RequestRecord};
use chrono::{DateTime, Utc};
use prometheus::{Encoder, GaugeVec, IntCounterVec, Opts, Registry, TextEncoder};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;
use uuid::Uuid;

const PERCENTILES: [usize; 4] = [50, 90, 95, 99];

/// Statistics of one request name
#[derive(Debug, Clone, Default)]
pub struct EndpointStats {
    pub requests: u64,
    pub failures: u64,
    pub failure_reasons: BTreeMap<String, u64>,
    pub latencies: Vec<Duration>,
}

impl EndpointStats {
    pub fn record(&mut self, record: &RequestRecord) {
        self.requests += 1;
        self.latencies.push(record.latency);
        if let Outcome::Failure(reason) = &record.outcome {
            self.failures += 1;
            *self.failure_reasons.entry(reason.clone()).or_insert(0) += 1;
        }
    }

    pub fn successes(&self) -> u64 {
        self.requests - self.failures
    }

    pub fn failure_ratio(&self) -> f64 {
        if self.requests == 0 {
            0.0
        } else {
            self.failures as f64 / self.requests as f64
        }
    }

    pub fn average_latency(&self) -> Duration {
        if self.latencies.is_empty() {
            Duration::ZERO
        } else {
            self.latencies.iter().sum::<Duration>() / self.latencies.len() as u32
        }
    }

    pub fn max_latency(&self) -> Duration {
        self.latencies.iter().max().copied().unwrap_or_default()
    }

    /// Nearest-rank latency percentiles as `(p, latency)` pairs for p50/p90/p95/p99
    pub fn percentiles(&self) -> Vec<(usize, Duration)> {
        if self.latencies.is_empty() {
            return Vec::new();
        }

        let mut sorted = self.latencies.clone();
        sorted.sort();

        PERCENTILES
            .iter()
            .map(|&p| {
                let index = (sorted.len() * p).div_ceil(100).saturating_sub(1);
                (p, sorted[index])
            })
            .collect()
    }
}

/// Running aggregate over every record the users report
#[derive(Debug, Clone, Default)]
pub struct LoadMetrics {
    endpoints: BTreeMap<&'static str, EndpointStats>,
}

impl LoadMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, record: &RequestRecord) {
        self.endpoints.entry(record.name).or_default().record(record);
    }

    pub fn endpoint(&self, name: &str) -> Option<&EndpointStats> {
        self.endpoints.get(name)
    }

    pub fn endpoints(&self) -> impl Iterator<Item = (&'static str, &EndpointStats)> {
        self.endpoints.iter().map(|(name, stats)| (*name, stats))
    }

    pub fn total_requests(&self) -> u64 {
        self.endpoints.values().map(|stats| stats.requests).sum()
    }

    pub fn total_failures(&self) -> u64 {
        self.endpoints.values().map(|stats| stats.failures).sum()
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EndpointSummary {
    pub name: String,
    pub requests: u64,
    pub failures: u64,
    pub failure_ratio: f64,
    pub requests_per_second: f64,
    pub avg_latency_ms: f64,
    pub max_latency_ms: f64,
    pub latency_percentiles_ms: BTreeMap<String, f64>,
    pub failure_reasons: BTreeMap<String, u64>,
}

impl EndpointSummary {
    fn from_stats(name: &str, stats: &EndpointStats, duration: Duration) -> Self {
        let latency_percentiles_ms = stats
            .percentiles()
            .into_iter()
            .map(|(p, latency)| (format!("p{}", p), as_millis(latency)))
            .collect();

        Self {
            name: name.to_string(),
            requests: stats.requests,
            failures: stats.failures,
            failure_ratio: stats.failure_ratio(),
            requests_per_second: per_second(stats.requests, duration),
            avg_latency_ms: as_millis(stats.average_latency()),
            max_latency_ms: as_millis(stats.max_latency()),
            latency_percentiles_ms,
            failure_reasons: stats.failure_reasons.clone(),
        }
    }
}

/// Final report of one load run
#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    pub run_id: Uuid,
    pub target: String,
    pub started_at: DateTime<Utc>,
    pub duration_secs: f64,
    pub users: u32,
    pub total_requests: u64,
    pub total_failures: u64,
    pub endpoints: Vec<EndpointSummary>,
}

impl LoadReport {
    pub fn new(
        target: impl Into<String>,
        started_at: DateTime<Utc>,
        users: u32,
        metrics: &LoadMetrics,
        duration: Duration,
    ) -> Self {
        let endpoints = metrics
            .endpoints()
            .map(|(name, stats)| EndpointSummary::from_stats(name, stats, duration))
            .collect();

        Self {
            run_id: Uuid::new_v4(),
            target: target.into(),
            started_at,
            duration_secs: duration.as_secs_f64(),
            users,
            total_requests: metrics.total_requests(),
            total_failures: metrics.total_failures(),
            endpoints,
        }
    }

    pub fn endpoint(&self, name: &str) -> Option<&EndpointSummary> {
        self.endpoints.iter().find(|endpoint| endpoint.name == name)
    }

    pub fn failure_ratio(&self) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            self.total_failures as f64 / self.total_requests as f64
        }
    }

    pub fn requests_per_second(&self) -> f64 {
        per_second(
            self.total_requests,
            Duration::from_secs_f64(self.duration_secs),
        )
    }

    /// True when the observed failure ratio is above `max_ratio`
    pub fn exceeds_failure_ratio(&self, max_ratio: f64) -> bool {
        self.failure_ratio() > max_ratio
    }

    pub fn to_json(&self) -> LoadResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Render the report in the Prometheus text exposition format
    pub fn render_prometheus(&self) -> LoadResult<String> {
        let registry = Registry::new();

        let requests = IntCounterVec::new(
            Opts::new("openbmc_load_requests_total", "Requests issued per endpoint"),
            &["name"],
        )?;
        let failures = IntCounterVec::new(
            Opts::new("openbmc_load_failures_total", "Failed requests per endpoint and reason"),
            &["name", "reason"],
        )?;
        let latency = GaugeVec::new(
            Opts::new("openbmc_load_latency_seconds", "Request latency quantiles per endpoint"),
            &["name", "quantile"],
        )?;
        let throughput = GaugeVec::new(
            Opts::new("openbmc_load_requests_per_second", "Request rate per endpoint"),
            &["name"],
        )?;

        registry.register(Box::new(requests.clone()))?;
        registry.register(Box::new(failures.clone()))?;
        registry.register(Box::new(latency.clone()))?;
        registry.register(Box::new(throughput.clone()))?;

        for endpoint in &self.endpoints {
            let name = endpoint.name.as_str();
            requests.with_label_values(&[name]).inc_by(endpoint.requests);
            for (reason, count) in &endpoint.failure_reasons {
                failures
                    .with_label_values(&[name, reason.as_str()])
                    .inc_by(*count);
            }
            for (p, millis) in &endpoint.latency_percentiles_ms {
                let quantile = quantile_label(p);
                latency
                    .with_label_values(&[name, quantile.as_str()])
                    .set(millis / 1000.0);
            }
            throughput
                .with_label_values(&[name])
                .set(endpoint.requests_per_second);
        }

        let mut buffer = Vec::new();
        TextEncoder::new().encode(&registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    pub fn print_summary(&self) {
        println!();
        println!("📊 OpenBMC Load Test Report");
        println!("{}", "=".repeat(96));
        println!("Run: {}", self.run_id);
        println!("Target: {}", self.target);
        println!("Started: {}", self.started_at.to_rfc3339());
        println!("Duration: {:.1}s with {} users", self.duration_secs, self.users);
        println!();
        println!(
            "{:<20} {:>9} {:>9} {:>9} {:>9} {:>9} {:>9} {:>9}",
            "Name", "Requests", "Failures", "Avg ms", "p50 ms", "p95 ms", "Max ms", "req/s"
        );
        println!("{}", "-".repeat(96));
        for endpoint in &self.endpoints {
            println!(
                "{:<20} {:>9} {:>9} {:>9.1} {:>9.1} {:>9.1} {:>9.1} {:>9.2}",
                endpoint.name,
                endpoint.requests,
                endpoint.failures,
                endpoint.avg_latency_ms,
                endpoint.latency_percentiles_ms.get("p50").copied().unwrap_or(0.0),
                endpoint.latency_percentiles_ms.get("p95").copied().unwrap_or(0.0),
                endpoint.max_latency_ms,
                endpoint.requests_per_second,
            );
        }
        println!("{}", "-".repeat(96));
        println!(
            "{:<20} {:>9} {:>9} {:>49.2}",
            "Aggregated",
            self.total_requests,
            self.total_failures,
            self.requests_per_second()
        );

        let failing: Vec<_> = self
            .endpoints
            .iter()
            .filter(|endpoint| !endpoint.failure_reasons.is_empty())
            .collect();
        if !failing.is_empty() {
            println!();
            println!("Failures:");
            for endpoint in failing {
                for (reason, count) in &endpoint.failure_reasons {
                    println!("  {:>6}  {}: {}", count, endpoint.name, reason);
                }
            }
        }

        println!();
        if self.total_failures == 0 {
            println!("✅ All requests succeeded");
        } else {
            println!("❌ Failure ratio: {:.2}%", self.failure_ratio() * 100.0);
        }
    }
}

fn as_millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

fn per_second(count: u64, duration: Duration) -> f64 {
    let secs = duration.as_secs_f64();
    if secs == 0.0 { 0.0 } else { count as f64 / secs }
}

// "p95" -> "0.95"
fn quantile_label(percentile: &str) -> String {
    let value: f64 = percentile
        .trim_start_matches('p')
        .parse()
        .unwrap_or_default();
    format!("{}", value / 100.0)
}
