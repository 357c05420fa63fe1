use super::{load_config, parse_arg};
use crate::error::{CliError, CliResult};
use clap::ArgMatches;
use openbmc_load::config::{LockoutConfig, PowerOnConfig};
use openbmc_load::smoke::SmokeSuite;

pub async fn handle_smoke_command(matches: &ArgMatches) -> CliResult<()> {
    let mut config = load_config(matches)?;

    if let Some(username) = matches.value_of("lockout-user") {
        let existing = config.smoke.lockout.take();
        let password = matches
            .value_of("lockout-password")
            .map(str::to_string)
            .or_else(|| existing.as_ref().map(|lockout| lockout.password.clone()))
            .unwrap_or_default();
        let attempts = match parse_arg::<u32>(matches, "lockout-attempts")? {
            Some(attempts) => attempts,
            None => existing.map(|lockout| lockout.attempts).unwrap_or(3),
        };

        config.smoke.lockout = Some(LockoutConfig {
            username: username.to_string(),
            password,
            attempts,
        });
    }

    if matches.is_present("power-on") {
        let mut power_on = config.smoke.power_on.take().unwrap_or_default();
        if let Some(settle) = parse_arg::<f64>(matches, "power-settle")? {
            power_on.settle_secs = settle;
        }
        config.smoke.power_on = Some(power_on);
    }

    let suite = SmokeSuite::new(&config)?;
    let report = suite.run().await;
    report.print_summary();

    if report.all_passed() {
        Ok(())
    } else {
        Err(CliError::SmokeChecksFailed {
            failed: report.failed().count(),
            total: report.checks.len(),
        })
    }
}
