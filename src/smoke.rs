//! HTTP-level smoke checks of an OpenBMC web interface.
//!
//! Covers what can be verified without a browser: the portal answers, the
//! configured account can open a Redfish session, bogus credentials are
//! refused and thermal readings are served. Two opt-in checks change server
//! state: repeated bad passwords must lock an account, and a power-on reset
//! must leave the chassis powered on.

use crate::client::{RedfishClient, SessionHeaders};
use crate::config::{Credentials, LoadConfig, LockoutConfig, PowerOnConfig};
use crate::error::LoadResult;
use crate::session::{self, AuthOutcome, is_session_created};
use crate::task::CHASSIS_PATH;
use log::{info, warn};
use serde::Serialize;
use serde_json::{Value, json};
use tokio::time::sleep;
use uuid::Uuid;

pub const THERMAL_PATH: &str = "/redfish/v1/Chassis/chassis/Thermal";
pub const RESET_PATH: &str = "/redfish/v1/Systems/system/Actions/ComputerSystem.Reset";

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CheckResult {
    pub name: &'static str,
    pub passed: bool,
    pub detail: String,
}

impl CheckResult {
    fn pass(name: &'static str, detail: impl Into<String>) -> Self {
        Self {
            name,
            passed: true,
            detail: detail.into(),
        }
    }

    fn fail(name: &'static str, detail: impl Into<String>) -> Self {
        Self {
            name,
            passed: false,
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SmokeReport {
    pub target: String,
    pub checks: Vec<CheckResult>,
}

impl SmokeReport {
    pub fn all_passed(&self) -> bool {
        self.checks.iter().all(|check| check.passed)
    }

    pub fn failed(&self) -> impl Iterator<Item = &CheckResult> {
        self.checks.iter().filter(|check| !check.passed)
    }

    pub fn check(&self, name: &str) -> Option<&CheckResult> {
        self.checks.iter().find(|check| check.name == name)
    }

    pub fn print_summary(&self) {
        println!();
        println!("🔎 OpenBMC Smoke Checks: {}", self.target);
        println!("{}", "=".repeat(60));
        for check in &self.checks {
            let mark = if check.passed { "✅" } else { "❌" };
            println!("{} {:<16} {}", mark, check.name, check.detail);
        }
        println!();

        let failed = self.failed().count();
        if failed == 0 {
            println!("✅ All {} checks passed", self.checks.len());
        } else {
            println!("❌ {} of {} checks failed", failed, self.checks.len());
        }
    }
}

pub struct SmokeSuite {
    client: RedfishClient,
    credentials: Credentials,
    lockout: Option<LockoutConfig>,
    power_on: Option<PowerOnConfig>,
}

impl SmokeSuite {
    pub fn new(config: &LoadConfig) -> LoadResult<Self> {
        config.validate()?;
        Ok(Self {
            client: RedfishClient::new(&config.target)?,
            credentials: config.credentials.clone(),
            lockout: config.smoke.lockout.clone(),
            power_on: config.smoke.power_on.clone(),
        })
    }

    /// Run every check in order; a failing check never stops the others.
    pub async fn run(&self) -> SmokeReport {
        let mut checks = vec![
            self.check_portal().await,
            self.check_login().await,
            self.check_rejected_login().await,
            self.check_thermal().await,
        ];

        if let Some(lockout) = &self.lockout {
            checks.push(self.check_lockout(lockout).await);
        }
        if let Some(power_on) = &self.power_on {
            checks.push(self.check_power_on(power_on).await);
        }

        for check in checks.iter().filter(|check| !check.passed) {
            warn!("Smoke check '{}' failed: {}", check.name, check.detail);
        }

        SmokeReport {
            target: self.client.base_url().to_string(),
            checks,
        }
    }

    pub async fn check_portal(&self) -> CheckResult {
        const NAME: &str = "portal";

        let response = match self.client.get("/", &SessionHeaders::anonymous()).await {
            Ok(response) => response,
            Err(e) => return CheckResult::fail(NAME, e.to_string()),
        };

        let page = response.text().to_lowercase();
        match ["openbmc", "username", "password"]
            .into_iter()
            .find(|word| page.contains(word))
        {
            Some(word) => CheckResult::pass(NAME, format!("HTTP {}, page mentions '{}'", response.status, word)),
            None => CheckResult::fail(
                NAME,
                format!("HTTP {}, no OpenBMC login page found", response.status),
            ),
        }
    }

    pub async fn check_login(&self) -> CheckResult {
        const NAME: &str = "login";

        let auth = session::authenticate(&self.client, &self.credentials).await;
        if auth.outcome.is_authenticated() {
            CheckResult::pass(NAME, format!("session token issued for '{}'", self.credentials.username))
        } else {
            CheckResult::fail(NAME, auth.outcome.to_string())
        }
    }

    pub async fn check_rejected_login(&self) -> CheckResult {
        const NAME: &str = "rejected-login";

        let bogus = Credentials::new(
            format!("smoke-{}", Uuid::new_v4().simple()),
            Uuid::new_v4().to_string(),
        );
        match session::create_session(&self.client, &bogus).await {
            Ok(response) if is_session_created(response.status) => CheckResult::fail(
                NAME,
                format!("unknown account accepted with HTTP {}", response.status),
            ),
            Ok(response) => CheckResult::pass(NAME, format!("refused with HTTP {}", response.status)),
            Err(e) => CheckResult::fail(NAME, e.to_string()),
        }
    }

    pub async fn check_thermal(&self) -> CheckResult {
        const NAME: &str = "thermal";

        let auth = session::authenticate(&self.client, &self.credentials).await;
        if !auth.outcome.is_authenticated() {
            return CheckResult::fail(NAME, format!("no session: {}", auth.outcome));
        }

        let response = match self.client.get(THERMAL_PATH, &auth.headers).await {
            Ok(response) => response,
            Err(e) => return CheckResult::fail(NAME, e.to_string()),
        };
        if response.status != 200 {
            return CheckResult::fail(NAME, format!("HTTP {}", response.status));
        }

        let body = response.text().to_lowercase();
        if body.contains("thermal") || body.contains("temperature") {
            CheckResult::pass(NAME, "thermal readings served")
        } else {
            CheckResult::fail(NAME, "response has no thermal data")
        }
    }

    /// Locks `lockout.username` on purpose: it must be a throwaway account.
    pub async fn check_lockout(&self, lockout: &LockoutConfig) -> CheckResult {
        const NAME: &str = "lockout";

        let wrong = Credentials::new(
            lockout.username.clone(),
            format!("{}-wrong-{}", lockout.password, Uuid::new_v4().simple()),
        );
        for attempt in 1..=lockout.attempts {
            match session::create_session(&self.client, &wrong).await {
                Ok(response) if is_session_created(response.status) => {
                    return CheckResult::fail(
                        NAME,
                        format!("wrong password accepted on attempt {}", attempt),
                    );
                }
                Ok(response) => info!(
                    "Lockout attempt {}/{} refused with HTTP {}",
                    attempt, lockout.attempts, response.status
                ),
                Err(e) => return CheckResult::fail(NAME, e.to_string()),
            }
        }

        let correct = Credentials::new(lockout.username.clone(), lockout.password.clone());
        let auth = session::authenticate(&self.client, &correct).await;
        match auth.outcome {
            AuthOutcome::Rejected { status } => CheckResult::pass(
                NAME,
                format!(
                    "'{}' locked after {} failures (HTTP {})",
                    lockout.username, lockout.attempts, status
                ),
            ),
            AuthOutcome::Unreachable(message) => CheckResult::fail(NAME, message),
            _ => CheckResult::fail(
                NAME,
                format!(
                    "'{}' still accepted after {} failures",
                    lockout.username, lockout.attempts
                ),
            ),
        }
    }

    /// Sends a real `On` reset to the system.
    pub async fn check_power_on(&self, power_on: &PowerOnConfig) -> CheckResult {
        const NAME: &str = "power-on";

        let auth = session::authenticate(&self.client, &self.credentials).await;
        if !auth.outcome.is_authenticated() {
            return CheckResult::fail(NAME, format!("no session: {}", auth.outcome));
        }

        let reset = json!({ "ResetType": "On" });
        match self.client.post_json(RESET_PATH, &reset, &auth.headers).await {
            Ok(response) if (200..300).contains(&response.status) => {
                info!("Power-on reset accepted with HTTP {}", response.status)
            }
            Ok(response) => {
                return CheckResult::fail(NAME, format!("reset refused with HTTP {}", response.status));
            }
            Err(e) => return CheckResult::fail(NAME, e.to_string()),
        }

        sleep(power_on.settle_time()).await;

        let response = match self.client.get(CHASSIS_PATH, &auth.headers).await {
            Ok(response) => response,
            Err(e) => return CheckResult::fail(NAME, e.to_string()),
        };
        if response.status != 200 {
            return CheckResult::fail(NAME, format!("HTTP {} reading power state", response.status));
        }

        let state = serde_json::from_slice::<Value>(&response.body)
            .ok()
            .and_then(|body| body["PowerState"].as_str().map(str::to_string));
        match state {
            Some(state) if state.eq_ignore_ascii_case("on") => {
                CheckResult::pass(NAME, "chassis reports PowerState On")
            }
            Some(state) => CheckResult::fail(NAME, format!("chassis reports PowerState {}", state)),
            None => CheckResult::fail(NAME, "response has no PowerState"),
        }
    }
}
