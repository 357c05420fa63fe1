//! Per-user behavior of the load profile.
//!
//! A [`SimulatedUser`] is consumed by its initialization step and becomes an
//! [`ActiveUser`] whose header overlay can no longer change.

use crate::client::{RedfishClient, SessionHeaders};
use crate::config::{Credentials, LoadProfileConfig};
use crate::error::{LoadError, LoadResult};
use crate::outcome::RequestRecord;
use crate::session::{self, AuthOutcome, SessionAuth};
use crate::task::TaskSet;
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::sleep;

/// Think time between two tasks, drawn uniformly from `[min, max]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaitTime {
    min: Duration,
    max: Duration,
}

impl WaitTime {
    pub fn between(min: Duration, max: Duration) -> Self {
        if max < min {
            Self { min: max, max: min }
        } else {
            Self { min, max }
        }
    }

    /// Fails on negative, NaN or out-of-range bounds
    pub fn from_profile(profile: &LoadProfileConfig) -> LoadResult<Self> {
        let bound = |name: &str, secs: f64| {
            Duration::try_from_secs_f64(secs)
                .map_err(|e| LoadError::Config(format!("{} of {}s: {}", name, secs, e)))
        };
        Ok(Self::between(
            bound("wait min", profile.wait_min_secs)?,
            bound("wait max", profile.wait_max_secs)?,
        ))
    }

    pub fn sample<R: Rng>(&self, rng: &mut R) -> Duration {
        if self.min == self.max {
            return self.min;
        }
        let secs = rng.gen_range(self.min.as_secs_f64()..=self.max.as_secs_f64());
        Duration::from_secs_f64(secs)
    }

    pub fn min(&self) -> Duration {
        self.min
    }

    pub fn max(&self) -> Duration {
        self.max
    }
}

/// A virtual client before its initialization step
pub struct SimulatedUser {
    id: u32,
    client: RedfishClient,
    credentials: Credentials,
    tasks: Arc<TaskSet>,
    wait: WaitTime,
    rng: StdRng,
}

impl SimulatedUser {
    pub fn new(
        id: u32,
        client: RedfishClient,
        credentials: Credentials,
        tasks: Arc<TaskSet>,
        wait: WaitTime,
        seed: Option<u64>,
    ) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(id as u64)),
            None => StdRng::from_entropy(),
        };

        Self {
            id,
            client,
            credentials,
            tasks,
            wait,
            rng,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    /// Log in once. The user always comes out active, authenticated or not.
    pub async fn on_start(self) -> (ActiveUser, SessionAuth) {
        let auth = session::authenticate(&self.client, &self.credentials).await;
        if !auth.outcome.is_authenticated() {
            debug!("User {} continues without a session token", self.id);
        }

        let user = ActiveUser {
            id: self.id,
            client: self.client,
            session: auth.headers.clone(),
            auth: auth.outcome.clone(),
            tasks: self.tasks,
            wait: self.wait,
            rng: self.rng,
        };
        (user, auth)
    }

    /// Full lifecycle: initialize, then pick, execute, report and pause until
    /// the task is aborted or the sink is closed.
    pub async fn run(self, sink: UnboundedSender<RequestRecord>) {
        let (mut user, auth) = self.on_start().await;
        if sink.send(auth.record).is_err() {
            return;
        }

        loop {
            let record = user.run_next_task().await;
            if sink.send(record).is_err() {
                debug!("User {} stopping: metrics sink closed", user.id);
                return;
            }
            user.pause().await;
        }
    }
}

/// A virtual client after initialization
pub struct ActiveUser {
    id: u32,
    client: RedfishClient,
    session: SessionHeaders,
    auth: AuthOutcome,
    tasks: Arc<TaskSet>,
    wait: WaitTime,
    rng: StdRng,
}

impl ActiveUser {
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn session(&self) -> &SessionHeaders {
        &self.session
    }

    pub fn auth_outcome(&self) -> &AuthOutcome {
        &self.auth
    }

    /// Draw one task from the weighted set and run it
    pub async fn run_next_task(&mut self) -> RequestRecord {
        let kind = self.tasks.pick(&mut self.rng).kind;
        kind.execute(&self.client, &self.session).await
    }

    pub fn next_wait(&mut self) -> Duration {
        self.wait.sample(&mut self.rng)
    }

    pub async fn pause(&mut self) {
        let wait = self.next_wait();
        sleep(wait).await;
    }
}
