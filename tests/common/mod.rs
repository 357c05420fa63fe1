//! Mock Redfish endpoints shared by the integration tests
#![allow(dead_code)]

use actix_web::{HttpRequest, HttpResponse, web};
use openbmc_load::config::LoadConfig;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

pub const TOKEN: &str = "abc123";

/// Token header seen on each request, in arrival order
#[derive(Default)]
pub struct SeenTokens(pub Mutex<Vec<Option<String>>>);

impl SeenTokens {
    pub fn snapshot(&self) -> Vec<Option<String>> {
        self.0.lock().unwrap().clone()
    }
}

pub fn token_of(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get("X-Auth-Token")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

fn credentials_of(body: &Value) -> (&str, &str) {
    (
        body["UserName"].as_str().unwrap_or_default(),
        body["Password"].as_str().unwrap_or_default(),
    )
}

/// Accepts root/0penBmc with 201 + token, refuses everything else with 401
pub async fn session_created(body: web::Json<Value>) -> HttpResponse {
    match credentials_of(&body) {
        ("root", "0penBmc") => HttpResponse::Created()
            .insert_header(("X-Auth-Token", TOKEN))
            .json(json!({"Id": "session-1", "UserName": "root"})),
        _ => HttpResponse::Unauthorized().finish(),
    }
}

pub async fn session_unauthorized() -> HttpResponse {
    HttpResponse::Unauthorized().finish()
}

pub async fn session_without_token() -> HttpResponse {
    HttpResponse::Ok().json(json!({"Id": "session-1"}))
}

pub async fn system_ok(req: HttpRequest, seen: web::Data<SeenTokens>) -> HttpResponse {
    seen.0.lock().unwrap().push(token_of(&req));
    HttpResponse::Ok().json(json!({"Id": "system", "Status": {"Health": "OK"}}))
}

pub async fn system_error(req: HttpRequest, seen: web::Data<SeenTokens>) -> HttpResponse {
    seen.0.lock().unwrap().push(token_of(&req));
    HttpResponse::InternalServerError().finish()
}

pub async fn chassis_ok(req: HttpRequest, seen: web::Data<SeenTokens>) -> HttpResponse {
    seen.0.lock().unwrap().push(token_of(&req));
    HttpResponse::Ok().json(json!({"PowerState": "On"}))
}

pub async fn chassis_empty(req: HttpRequest, seen: web::Data<SeenTokens>) -> HttpResponse {
    seen.0.lock().unwrap().push(token_of(&req));
    HttpResponse::Ok().json(json!({}))
}

/// 401 unless the session token is attached
pub async fn chassis_requires_token(req: HttpRequest) -> HttpResponse {
    match token_of(&req).as_deref() {
        Some(TOKEN) => HttpResponse::Ok().json(json!({"PowerState": "Off"})),
        _ => HttpResponse::Unauthorized().finish(),
    }
}

pub async fn system_requires_token(req: HttpRequest) -> HttpResponse {
    match token_of(&req).as_deref() {
        Some(TOKEN) => HttpResponse::Ok().json(json!({"Id": "system", "Status": {"State": "Enabled"}})),
        _ => HttpResponse::Unauthorized().finish(),
    }
}

pub async fn portal() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html")
        .body("<html><head><title>OpenBMC</title></head><body><input id=\"username\"></body></html>")
}

pub async fn thermal_requires_token(req: HttpRequest) -> HttpResponse {
    match token_of(&req).as_deref() {
        Some(TOKEN) => HttpResponse::Ok().json(json!({
            "@odata.type": "#Thermal.v1_7_0.Thermal",
            "Temperatures": [{"Name": "CPU0", "ReadingCelsius": 41}]
        })),
        _ => HttpResponse::Unauthorized().finish(),
    }
}

pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().finish()
}

/// Bad passwords per account; an account with three failures stays locked
#[derive(Default)]
pub struct LockoutState(pub Mutex<HashMap<String, u32>>);

pub async fn session_with_lockout(
    body: web::Json<Value>,
    state: web::Data<LockoutState>,
) -> HttpResponse {
    let (user, password) = credentials_of(&body);
    let mut failures = state.0.lock().unwrap();
    let count = failures.entry(user.to_string()).or_insert(0);

    let valid = matches!((user, password), ("root", "0penBmc") | ("testuser", "TestKolya"));
    if *count >= 3 || !valid {
        *count += 1;
        return HttpResponse::Unauthorized().finish();
    }

    HttpResponse::Created()
        .insert_header(("X-Auth-Token", TOKEN))
        .json(json!({"Id": "session-1"}))
}

/// Chassis power state changed by the reset action
pub struct PowerState(pub Mutex<&'static str>);

impl Default for PowerState {
    fn default() -> Self {
        Self(Mutex::new("Off"))
    }
}

/// Applies `ResetType: On` with 204; anything else is a 400
pub async fn reset_action(
    req: HttpRequest,
    body: web::Json<Value>,
    power: web::Data<PowerState>,
) -> HttpResponse {
    if token_of(&req).as_deref() != Some(TOKEN) {
        return HttpResponse::Unauthorized().finish();
    }
    match body["ResetType"].as_str() {
        Some("On") => {
            *power.0.lock().unwrap() = "On";
            HttpResponse::NoContent().finish()
        }
        _ => HttpResponse::BadRequest().finish(),
    }
}

/// Accepts the reset but never powers on
pub async fn reset_ignored() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

pub async fn chassis_power_state(req: HttpRequest, power: web::Data<PowerState>) -> HttpResponse {
    match token_of(&req).as_deref() {
        Some(TOKEN) => HttpResponse::Ok().json(json!({"PowerState": *power.0.lock().unwrap()})),
        _ => HttpResponse::Unauthorized().finish(),
    }
}

/// Answers long after any short client timeout
pub async fn stalled() -> HttpResponse {
    actix_rt::time::sleep(Duration::from_secs(2)).await;
    HttpResponse::Ok().json(json!({"Id": "system", "Status": {}}))
}

/// Fast-paced configuration pointing at a test server
pub fn config_for(srv: &actix_test::TestServer) -> LoadConfig {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut config = LoadConfig::default();
    config.target.host = format!("http://{}", srv.addr());
    config.target.request_timeout_secs = 5.0;
    config.load.wait_min_secs = 0.01;
    config.load.wait_max_secs = 0.03;
    config.load.spawn_rate = 50.0;
    config.load.seed = Some(42);
    config
}
