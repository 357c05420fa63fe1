use crate::error::{LoadError, LoadResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// Complete configuration for a load run or a smoke pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoadConfig {
    pub target: TargetConfig,
    pub credentials: Credentials,
    pub load: LoadProfileConfig,
    pub logging: LoggingConfig,
    pub smoke: SmokeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TargetConfig {
    pub host: String,
    pub verify_tls: bool,
    pub request_timeout_secs: f64,
}

#[derive(Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoadProfileConfig {
    pub users: u32,
    pub spawn_rate: f64,    // users per second
    pub run_time_secs: f64,
    pub wait_min_secs: f64,
    pub wait_max_secs: f64,
    pub seed: Option<u64>,
    pub max_failure_ratio: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SmokeConfig {
    pub lockout: Option<LockoutConfig>,
    pub power_on: Option<PowerOnConfig>,
}

/// Power-on check. Issues a real reset action, so it only runs when set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PowerOnConfig {
    /// Pause between the reset action and reading the power state
    pub settle_secs: f64,
}

/// Account used by the lockout smoke check. It gets locked on purpose, so it
/// must never be the account the load profile logs in with.
#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct LockoutConfig {
    pub username: String,
    pub password: String,
    #[serde(default = "default_lockout_attempts")]
    pub attempts: u32,
}

fn default_lockout_attempts() -> u32 {
    3
}

impl Default for PowerOnConfig {
    fn default() -> Self {
        Self { settle_secs: 10.0 }
    }
}

impl PowerOnConfig {
    pub fn settle_time(&self) -> Duration {
        Duration::from_secs_f64(self.settle_secs)
    }
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            host: "https://localhost:2443".to_string(),
            verify_tls: false,
            request_timeout_secs: 30.0,
        }
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            username: "root".to_string(),
            password: "0penBmc".to_string(),
        }
    }
}

impl Default for LoadProfileConfig {
    fn default() -> Self {
        Self {
            users: 10,
            spawn_rate: 1.0,
            run_time_secs: 60.0,
            wait_min_secs: 2.0,
            wait_max_secs: 5.0,
            seed: None,
            max_failure_ratio: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl fmt::Debug for LockoutConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockoutConfig")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("attempts", &self.attempts)
            .finish()
    }
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl TargetConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.request_timeout_secs)
    }
}

impl LoadProfileConfig {
    pub fn run_time(&self) -> Duration {
        Duration::from_secs_f64(self.run_time_secs)
    }

    /// Delay between two user spawns
    pub fn spawn_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.spawn_rate)
    }
}

impl LoadConfig {
    /// Load configuration from a JSON file. Missing sections and fields keep
    /// their defaults.
    pub fn from_file(path: &Path) -> LoadResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_json::from_str::<LoadConfig>(&content)?;
        Ok(config)
    }

    /// Defaults overridden by environment variables
    pub fn load_from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply `OPENBMC_*` overrides read through `lookup`. Values that do not
    /// parse are ignored.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("OPENBMC_HOST") {
            self.target.host = host;
        }

        if let Some(username) = lookup("OPENBMC_USERNAME") {
            self.credentials.username = username;
        }

        if let Some(password) = lookup("OPENBMC_PASSWORD") {
            self.credentials.password = password;
        }

        if let Some(verify) = lookup("OPENBMC_VERIFY_TLS") {
            self.target.verify_tls = verify.parse().unwrap_or(self.target.verify_tls);
        }

        if let Some(users) = lookup("OPENBMC_USERS") {
            self.load.users = users.parse().unwrap_or(self.load.users);
        }

        if let Some(log_level) = lookup("OPENBMC_LOG_LEVEL") {
            self.logging.level = match log_level.to_lowercase().as_str() {
                level @ ("trace" | "debug" | "info" | "warn" | "error" | "off") => {
                    level.to_string()
                }
                _ => self.logging.level.clone(),
            };
        }
    }

    pub fn validate(&self) -> LoadResult<()> {
        reqwest::Url::parse(&self.target.host).map_err(|e| {
            LoadError::Config(format!("invalid host '{}': {}", self.target.host, e))
        })?;

        if !(self.target.request_timeout_secs > 0.0) {
            return Err(LoadError::Config(
                "request timeout must be greater than zero".to_string(),
            ));
        }

        let load = &self.load;
        if load.users == 0 {
            return Err(LoadError::Config(
                "users must be greater than zero".to_string(),
            ));
        }
        if !(load.spawn_rate > 0.0) {
            return Err(LoadError::Config(
                "spawn rate must be greater than zero".to_string(),
            ));
        }
        if !(load.run_time_secs > 0.0) {
            return Err(LoadError::Config(
                "run time must be greater than zero".to_string(),
            ));
        }
        if !(load.wait_min_secs >= 0.0) || !load.wait_max_secs.is_finite() {
            return Err(LoadError::Config(
                "wait bounds must be finite and non-negative".to_string(),
            ));
        }
        if load.wait_max_secs < load.wait_min_secs {
            return Err(LoadError::Config(format!(
                "wait max ({}) is below wait min ({})",
                load.wait_max_secs, load.wait_min_secs
            )));
        }
        for (what, secs) in [
            ("request timeout", self.target.request_timeout_secs),
            ("run time", load.run_time_secs),
            ("spawn interval", 1.0 / load.spawn_rate),
            ("wait max", load.wait_max_secs),
        ] {
            Duration::try_from_secs_f64(secs)
                .map_err(|e| LoadError::Config(format!("{} of {}s: {}", what, secs, e)))?;
        }
        if let Some(ratio) = load.max_failure_ratio {
            if !(0.0..=1.0).contains(&ratio) {
                return Err(LoadError::Config(format!(
                    "max failure ratio {} is outside [0, 1]",
                    ratio
                )));
            }
        }
        if let Some(lockout) = &self.smoke.lockout {
            if lockout.attempts == 0 {
                return Err(LoadError::Config(
                    "lockout attempts must be greater than zero".to_string(),
                ));
            }
        }
        if let Some(power_on) = &self.smoke.power_on {
            Duration::try_from_secs_f64(power_on.settle_secs).map_err(|e| {
                LoadError::Config(format!(
                    "power-on settle time of {}s: {}",
                    power_on.settle_secs, e
                ))
            })?;
        }

        Ok(())
    }
}
