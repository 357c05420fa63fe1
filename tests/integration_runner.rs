//! End-to-end load runs against mock Redfish servers

mod common;

use actix_web::{App, web};
use common::*;
use openbmc_load::LoadRunner;
use openbmc_load::session::SESSIONS_PATH;
use openbmc_load::task::{CHASSIS_PATH, SYSTEM_PATH};

#[actix_rt::test]
async fn test_run_against_healthy_bmc() {
    let srv = actix_test::start(|| {
        App::new()
            .route(SESSIONS_PATH, web::post().to(session_created))
            .route(SYSTEM_PATH, web::get().to(system_requires_token))
            .route(CHASSIS_PATH, web::get().to(chassis_requires_token))
    });
    let mut config = config_for(&srv);
    config.load.users = 3;
    config.load.run_time_secs = 0.8;

    let report = LoadRunner::new(config).unwrap().run().await.unwrap();

    assert_eq!(report.users, 3);
    assert_eq!(report.total_failures, 0, "{:?}", report.endpoints);

    let sessions = report.endpoint("Create Session").unwrap();
    assert_eq!(sessions.requests, 3);

    let system = report.endpoint("Get System Info").unwrap();
    let power = report.endpoint("Get PowerState").unwrap();
    assert!(system.requests > 0);
    assert!(power.requests > 0);
    assert_eq!(
        report.total_requests,
        sessions.requests + system.requests + power.requests
    );
    assert!(!report.exceeds_failure_ratio(0.0));
}

#[actix_rt::test]
async fn test_failed_login_cascades_into_task_failures() {
    let srv = actix_test::start(|| {
        App::new()
            .route(SESSIONS_PATH, web::post().to(session_unauthorized))
            .route(SYSTEM_PATH, web::get().to(system_requires_token))
            .route(CHASSIS_PATH, web::get().to(chassis_requires_token))
    });
    let mut config = config_for(&srv);
    config.load.users = 2;
    config.load.run_time_secs = 0.5;

    let report = LoadRunner::new(config).unwrap().run().await.unwrap();

    // Users keep running after the failed login; every request then fails
    assert!(report.total_requests > 2);
    assert_eq!(report.total_requests, report.total_failures);
    for endpoint in &report.endpoints {
        assert_eq!(endpoint.failure_reasons.len(), 1, "{}", endpoint.name);
        assert_eq!(endpoint.failure_reasons["HTTP 401"], endpoint.requests);
    }
    assert!(report.exceeds_failure_ratio(0.5));
}

#[actix_rt::test]
async fn test_report_exports() {
    let srv = actix_test::start(|| {
        App::new()
            .route(SESSIONS_PATH, web::post().to(session_created))
            .route(SYSTEM_PATH, web::get().to(system_requires_token))
            .route(CHASSIS_PATH, web::get().to(chassis_requires_token))
    });
    let mut config = config_for(&srv);
    config.load.users = 1;
    config.load.run_time_secs = 0.3;

    let report = LoadRunner::new(config).unwrap().run().await.unwrap();

    let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
    assert_eq!(json["users"], 1);
    assert!(json["run_id"].as_str().is_some());

    let text = report.render_prometheus().unwrap();
    assert!(text.contains("openbmc_load_requests_total{name=\"Create Session\"} 1"));
}
