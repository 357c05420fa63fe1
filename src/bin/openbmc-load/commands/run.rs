use super::{load_config, parse_arg};
use crate::error::{CliError, CliResult};
use clap::ArgMatches;
use log::info;
use openbmc_load::runner::LoadRunner;
use std::fs;

pub async fn handle_run_command(matches: &ArgMatches) -> CliResult<()> {
    let mut config = load_config(matches)?;

    if let Some(users) = parse_arg::<u32>(matches, "users")? {
        config.load.users = users;
    }
    if let Some(rate) = parse_arg::<f64>(matches, "spawn-rate")? {
        config.load.spawn_rate = rate;
    }
    if let Some(run_time) = parse_arg::<f64>(matches, "run-time")? {
        config.load.run_time_secs = run_time;
    }
    if let Some(wait_min) = parse_arg::<f64>(matches, "wait-min")? {
        config.load.wait_min_secs = wait_min;
    }
    if let Some(wait_max) = parse_arg::<f64>(matches, "wait-max")? {
        config.load.wait_max_secs = wait_max;
    }
    if let Some(seed) = parse_arg::<u64>(matches, "seed")? {
        config.load.seed = Some(seed);
    }
    if let Some(ratio) = parse_arg::<f64>(matches, "max-failure-ratio")? {
        config.load.max_failure_ratio = Some(ratio);
    }

    let runner = LoadRunner::new(config)?;
    let report = runner.run_until_interrupted().await?;
    report.print_summary();

    if let Some(path) = matches.value_of("report-json") {
        fs::write(path, report.to_json()?)?;
        info!("JSON report written to {}", path);
    }
    if let Some(path) = matches.value_of("prometheus") {
        fs::write(path, report.render_prometheus()?)?;
        info!("Prometheus report written to {}", path);
    }

    match runner.config().load.max_failure_ratio {
        Some(max) if report.exceeds_failure_ratio(max) => Err(CliError::FailureRatioExceeded {
            observed: report.failure_ratio(),
            max,
        }),
        _ => Ok(()),
    }
}
