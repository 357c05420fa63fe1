pub mod run;
pub mod smoke;

pub use run::handle_run_command;
pub use smoke::handle_smoke_command;

use crate::error::{CliError, CliResult};
use clap::ArgMatches;
use openbmc_load::config::LoadConfig;
use openbmc_load::logging::init_logging;
use std::path::Path;
use std::str::FromStr;

/// Defaults, then `--config`, then `OPENBMC_*` variables, then flags.
/// Installs the logger at the resulting level.
pub fn load_config(matches: &ArgMatches) -> CliResult<LoadConfig> {
    let mut config = match matches.value_of("config") {
        Some(path) => LoadConfig::from_file(Path::new(path))?,
        None => LoadConfig::default(),
    };
    config.apply_env_overrides();

    if let Some(host) = matches.value_of("host") {
        config.target.host = host.to_string();
    }
    if let Some(username) = matches.value_of("username") {
        config.credentials.username = username.to_string();
    }
    if let Some(password) = matches.value_of("password") {
        config.credentials.password = password.to_string();
    }
    if matches.is_present("verify-tls") {
        config.target.verify_tls = true;
    }
    if let Some(timeout) = parse_arg::<f64>(matches, "timeout")? {
        config.target.request_timeout_secs = timeout;
    }
    if let Some(level) = matches.value_of("log-level") {
        config.logging.level = level.to_string();
    }

    init_logging(&config.logging.level)?;
    Ok(config)
}

pub fn parse_arg<T>(matches: &ArgMatches, name: &str) -> CliResult<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match matches.value_of(name) {
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|e| CliError::ParseError {
                field: name.to_string(),
                message: format!("'{}': {}", raw, e),
            }),
        None => Ok(None),
    }
}
