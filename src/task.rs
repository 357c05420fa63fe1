//! Weighted read-only tasks of the load profile and their response contracts.

use crate::client::{RedfishClient, SessionHeaders};
use crate::outcome::{Outcome, RequestRecord};
use log::debug;
use rand::Rng;
use serde_json::Value;
use std::time::Instant;

pub const SYSTEM_PATH: &str = "/redfish/v1/Systems/system";
pub const CHASSIS_PATH: &str = "/redfish/v1/Chassis/chassis";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    ViewSystemInfo,
    ViewPowerState,
}

impl TaskKind {
    /// Name the request is reported under
    pub fn request_name(&self) -> &'static str {
        match self {
            TaskKind::ViewSystemInfo => "Get System Info",
            TaskKind::ViewPowerState => "Get PowerState",
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            TaskKind::ViewSystemInfo => SYSTEM_PATH,
            TaskKind::ViewPowerState => CHASSIS_PATH,
        }
    }

    pub fn default_weight(&self) -> u32 {
        match self {
            TaskKind::ViewSystemInfo => 3,
            TaskKind::ViewPowerState => 2,
        }
    }

    /// Top-level keys a 200 body must carry
    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            TaskKind::ViewSystemInfo => &["Id", "Status"],
            TaskKind::ViewPowerState => &["PowerState"],
        }
    }

    /// Score a response against the task's contract.
    pub fn classify(&self, status: u16, body: &[u8]) -> Outcome {
        if status != 200 {
            return Outcome::http_status(status);
        }

        match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(fields))
                if self
                    .required_fields()
                    .iter()
                    .all(|field| fields.contains_key(*field)) =>
            {
                Outcome::Success
            }
            _ => Outcome::contract_violation(),
        }
    }

    /// Issue the task's request and classify the result.
    pub async fn execute(&self, client: &RedfishClient, session: &SessionHeaders) -> RequestRecord {
        let started = Instant::now();
        match client.get(self.path(), session).await {
            Ok(response) => RequestRecord {
                name: self.request_name(),
                status: Some(response.status),
                latency: response.latency,
                outcome: self.classify(response.status, &response.body),
            },
            Err(e) => {
                debug!("{} transport error: {}", self.request_name(), e);
                RequestRecord {
                    name: self.request_name(),
                    status: None,
                    // Time spent until the timeout or refusal
                    latency: started.elapsed(),
                    outcome: Outcome::failure(format!("transport error: {}", e)),
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Task {
    pub kind: TaskKind,
    pub weight: u32,
}

/// Discrete weighted distribution over a fixed task list.
///
/// The cumulative table is built once; a pick maps one uniform draw in
/// `0..total` to the first bucket whose upper bound exceeds it.
#[derive(Debug, Clone)]
pub struct TaskSet {
    tasks: Vec<Task>,
    cumulative: Vec<u32>,
    total: u32,
}

impl TaskSet {
    /// Zero-weight tasks are never picked. Returns `None` if nothing is pickable.
    pub fn new(tasks: Vec<Task>) -> Option<Self> {
        let mut cumulative = Vec::with_capacity(tasks.len());
        let mut total: u32 = 0;
        for task in &tasks {
            total = total.checked_add(task.weight)?;
            cumulative.push(total);
        }

        if total == 0 {
            return None;
        }

        Some(Self {
            tasks,
            cumulative,
            total,
        })
    }

    /// System info at weight 3, power state at weight 2
    pub fn openbmc_profile() -> Self {
        let tasks: Vec<Task> = [TaskKind::ViewSystemInfo, TaskKind::ViewPowerState]
            .into_iter()
            .map(|kind| Task {
                kind,
                weight: kind.default_weight(),
            })
            .collect();

        // Both default weights are non-zero, so the fallback is never taken
        Self::new(tasks).unwrap_or(Self {
            tasks: vec![Task {
                kind: TaskKind::ViewSystemInfo,
                weight: 1,
            }],
            cumulative: vec![1],
            total: 1,
        })
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn total_weight(&self) -> u32 {
        self.total
    }

    pub fn pick<R: Rng>(&self, rng: &mut R) -> &Task {
        let draw = rng.gen_range(0..self.total);
        let index = self.cumulative.partition_point(|&bound| bound <= draw);
        &self.tasks[index]
    }
}
