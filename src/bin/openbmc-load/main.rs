use clap::{App, Arg, SubCommand};

mod commands;
mod error;

use commands::*;
use error::CliError;

fn target_args() -> Vec<Arg<'static>> {
    vec![
        Arg::new("host")
            .short('H')
            .long("host")
            .value_name("URL")
            .help("Base URL of the BMC, e.g. https://localhost:2443")
            .takes_value(true),
        Arg::new("username")
            .short('U')
            .long("username")
            .value_name("USERNAME")
            .help("Account used to open Redfish sessions")
            .takes_value(true),
        Arg::new("password")
            .short('P')
            .long("password")
            .value_name("PASSWORD")
            .help("Password of the session account")
            .takes_value(true),
        Arg::new("verify-tls")
            .long("verify-tls")
            .help("Verify the BMC certificate (off by default for self-signed lab BMCs)"),
        Arg::new("timeout")
            .long("timeout")
            .value_name("SECONDS")
            .help("Per-request timeout")
            .takes_value(true),
    ]
}

fn cli() -> App<'static> {
    App::new("openbmc-load")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Redfish load profile and smoke checks for OpenBMC")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("JSON configuration file")
                .takes_value(true)
                .global(true),
        )
        .arg(
            Arg::new("log-level")
                .short('l')
                .long("log-level")
                .value_name("LEVEL")
                .help("Log level (trace, debug, info, warn, error, off)")
                .takes_value(true)
                .global(true),
        )
        .subcommand(
            SubCommand::with_name("run")
                .about("Run the load profile against the BMC")
                .args(target_args())
                .arg(
                    Arg::new("users")
                        .short('u')
                        .long("users")
                        .value_name("USERS")
                        .help("Number of concurrent simulated users")
                        .takes_value(true),
                )
                .arg(
                    Arg::new("spawn-rate")
                        .short('r')
                        .long("spawn-rate")
                        .value_name("USERS_PER_SEC")
                        .help("Users started per second")
                        .takes_value(true),
                )
                .arg(
                    Arg::new("run-time")
                        .short('t')
                        .long("run-time")
                        .value_name("SECONDS")
                        .help("Total run time")
                        .takes_value(true),
                )
                .arg(
                    Arg::new("wait-min")
                        .long("wait-min")
                        .value_name("SECONDS")
                        .help("Lower bound of the think time between tasks")
                        .takes_value(true),
                )
                .arg(
                    Arg::new("wait-max")
                        .long("wait-max")
                        .value_name("SECONDS")
                        .help("Upper bound of the think time between tasks")
                        .takes_value(true),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .value_name("SEED")
                        .help("Seed for reproducible task selection and pacing")
                        .takes_value(true),
                )
                .arg(
                    Arg::new("max-failure-ratio")
                        .long("max-failure-ratio")
                        .value_name("RATIO")
                        .help("Exit non-zero when the failure ratio (0..1) is above this")
                        .takes_value(true),
                )
                .arg(
                    Arg::new("report-json")
                        .long("report-json")
                        .value_name("FILE")
                        .help("Write the report as JSON")
                        .takes_value(true),
                )
                .arg(
                    Arg::new("prometheus")
                        .long("prometheus")
                        .value_name("FILE")
                        .help("Write the report in Prometheus text format")
                        .takes_value(true),
                ),
        )
        .subcommand(
            SubCommand::with_name("smoke")
                .about("Check portal, login, thermal readings and optionally account lockout and power-on")
                .args(target_args())
                .arg(
                    Arg::new("lockout-user")
                        .long("lockout-user")
                        .value_name("USERNAME")
                        .help("Throwaway account to lock with bad passwords")
                        .takes_value(true),
                )
                .arg(
                    Arg::new("lockout-password")
                        .long("lockout-password")
                        .value_name("PASSWORD")
                        .help("Real password of the lockout account")
                        .takes_value(true)
                        .requires("lockout-user"),
                )
                .arg(
                    Arg::new("lockout-attempts")
                        .long("lockout-attempts")
                        .value_name("COUNT")
                        .help("Bad passwords to send before the lockout check")
                        .takes_value(true)
                        .requires("lockout-user"),
                )
                .arg(
                    Arg::new("power-on")
                        .long("power-on")
                        .help("Send a power-on reset and check the chassis reports PowerState On"),
                )
                .arg(
                    Arg::new("power-settle")
                        .long("power-settle")
                        .value_name("SECONDS")
                        .help("Wait between the reset and reading the power state")
                        .takes_value(true)
                        .requires("power-on"),
                ),
        )
}

#[tokio::main]
async fn main() {
    let matches = cli().get_matches();

    let result = match matches.subcommand() {
        Some(("run", sub_matches)) => handle_run_command(sub_matches).await,
        Some(("smoke", sub_matches)) => handle_smoke_command(sub_matches).await,
        Some((cmd, _)) => Err(CliError::UnknownCommand(cmd.to_string())),
        None => Err(CliError::NoCommand),
    };

    if let Err(err) = result {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}
