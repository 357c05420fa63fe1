//! # openbmc-load
//!
//! A Redfish load profile and smoke-check tool for [OpenBMC] servers.
//!
//! Each simulated user logs in once through the Redfish session service,
//! keeps the `X-Auth-Token` it was given, and then keeps picking one of two
//! weighted read-only tasks:
//!
//! | Task              | Request                              | Weight | Success when          |
//! |-------------------|--------------------------------------|--------|-----------------------|
//! | `Get System Info` | `GET /redfish/v1/Systems/system`     | 3      | 200 with `Id`, `Status` |
//! | `Get PowerState`  | `GET /redfish/v1/Chassis/chassis`    | 2      | 200 with `PowerState`   |
//!
//! Between two tasks a user idles for a uniformly drawn 2 to 5 seconds.
//! A failed login is reported and the user keeps running without a token.
//!
//! ## Basic Usage
//!
//! ```no_run
//! use openbmc_load::config::LoadConfig;
//! use openbmc_load::runner::LoadRunner;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut config = LoadConfig::load_from_env();
//!     config.load.users = 20;
//!     config.load.run_time_secs = 120.0;
//!
//!     let report = LoadRunner::new(config)?.run().await?;
//!     report.print_summary();
//!     Ok(())
//! }
//! ```
//!
//! ## CLI
//!
//! ```bash
//! openbmc-load run --host https://localhost:2443 --users 20 --spawn-rate 2 --run-time 120
//! openbmc-load smoke --host https://localhost:2443
//! ```
//!
//! Certificates are not verified unless `--verify-tls` is given: lab BMCs
//! serve self-signed certificates.
//!
//! [OpenBMC]: https://github.com/openbmc/openbmc

pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod outcome;
pub mod runner;
pub mod session;
pub mod smoke;
pub mod task;
pub mod user;

pub use client::{AUTH_TOKEN_HEADER, RedfishClient, SessionHeaders};
pub use config::LoadConfig;
pub use error::{LoadError, LoadResult};
pub use metrics::LoadReport;
pub use outcome::{Outcome, RequestRecord};
pub use runner::LoadRunner;
pub use smoke::{SmokeReport, SmokeSuite};
pub use task::{TaskKind, TaskSet};
