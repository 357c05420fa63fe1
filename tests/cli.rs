//! Command line behavior of the `openbmc-load` binary

mod common;

use actix_web::{App, web};
use assert_cmd::Command;
use common::*;
use openbmc_load::session::SESSIONS_PATH;
use openbmc_load::task::{CHASSIS_PATH, SYSTEM_PATH};
use predicates::prelude::*;
use tempfile::tempdir;

fn openbmc_load() -> Command {
    let mut cmd = Command::cargo_bin("openbmc-load").unwrap();
    for key in [
        "OPENBMC_HOST",
        "OPENBMC_USERNAME",
        "OPENBMC_PASSWORD",
        "OPENBMC_VERIFY_TLS",
        "OPENBMC_USERS",
        "OPENBMC_LOG_LEVEL",
    ] {
        cmd.env_remove(key);
    }
    cmd
}

#[test]
fn test_help_lists_subcommands() {
    openbmc_load()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("smoke"));
}

#[test]
fn test_no_command() {
    openbmc_load()
        .assert()
        .failure()
        .stderr(predicate::str::contains("No command provided"));
}

#[test]
fn test_zero_users_is_a_configuration_error() {
    openbmc_load()
        .args(["run", "--users", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("users must be greater than zero"));
}

#[test]
fn test_inverted_wait_bounds_are_rejected() {
    openbmc_load()
        .args(["run", "--wait-min", "5", "--wait-max", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"));
}

#[test]
fn test_unparseable_flag() {
    openbmc_load()
        .args(["run", "--users", "lots"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Parse error (users)"));
}

#[test]
fn test_missing_config_file() {
    openbmc_load()
        .args(["--config", "/nonexistent/openbmc-load.json", "run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("IO error"));
}

#[actix_rt::test]
async fn test_run_writes_reports() {
    let srv = actix_test::start(|| {
        App::new()
            .route(SESSIONS_PATH, web::post().to(session_created))
            .route(SYSTEM_PATH, web::get().to(system_requires_token))
            .route(CHASSIS_PATH, web::get().to(chassis_requires_token))
    });
    let dir = tempdir().unwrap();
    let json_path = dir.path().join("report.json");
    let prom_path = dir.path().join("report.prom");
    let host = format!("http://{}", srv.addr());

    openbmc_load()
        .args(["--log-level", "warn", "run", "--host", &host])
        .args(["--users", "2", "--spawn-rate", "20", "--run-time", "0.5"])
        .args(["--wait-min", "0.01", "--wait-max", "0.02"])
        .args(["--max-failure-ratio", "0"])
        .arg("--report-json")
        .arg(&json_path)
        .arg("--prometheus")
        .arg(&prom_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("All requests succeeded"));

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(report["users"], 2);
    assert_eq!(report["total_failures"], 0);

    let prom = std::fs::read_to_string(&prom_path).unwrap();
    assert!(prom.contains("openbmc_load_requests_total"));
}

#[actix_rt::test]
async fn test_failure_ratio_threshold_sets_exit_code() {
    let srv = actix_test::start(|| {
        App::new()
            .route(SESSIONS_PATH, web::post().to(session_unauthorized))
            .route(SYSTEM_PATH, web::get().to(system_requires_token))
            .route(CHASSIS_PATH, web::get().to(chassis_requires_token))
    });
    let host = format!("http://{}", srv.addr());

    openbmc_load()
        .args(["--log-level", "off", "run", "--host", &host])
        .args(["--users", "1", "--run-time", "0.3"])
        .args(["--wait-min", "0.01", "--wait-max", "0.02"])
        .args(["--max-failure-ratio", "0.1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("exceeds the allowed 10.00%"));
}
