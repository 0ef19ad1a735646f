//! Webhook API tests against in-memory collaborators

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::NaiveDate;
use serde_json::Value;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};
use tower::ServiceExt;

use turnover_thermostat::{
    config::AppConfig,
    create_router,
    error::{AppError, AppResult},
    models::{
        ActionAttempt, AuditLogEntry, BookingRow, Device, DeviceCapabilities, EventType, HvacMode,
    },
    services::{
        audit_log::AuditLog,
        bookings::BookingStore,
        clock::FixedClock,
        thermostat::{ThermostatActuator, ThermostatController},
        turnover::TurnoverService,
        weather::WeatherSource,
        Services,
    },
    AppState,
};

const TOKEN: &str = "s3cret";
const TODAY: &str = "2024-06-10";
const NICKNAME: &str = "SensiHanover";

struct FakeBookings {
    rows: Vec<BookingRow>,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl BookingStore for FakeBookings {
    async fn fetch_rows(&self) -> AppResult<Vec<BookingRow>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.rows.clone())
    }
}

struct FakeWeather {
    temp_f: f64,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl WeatherSource for FakeWeather {
    async fn current_temp_f(&self) -> AppResult<f64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.temp_f)
    }
}

struct FakeActuator {
    capabilities: DeviceCapabilities,
    commands: Arc<Mutex<Vec<String>>>,
}

impl FakeActuator {
    fn device(&self) -> Device {
        Device {
            device_id: "dev_1".to_string(),
            nickname: Some(NICKNAME.to_string()),
            capabilities: self.capabilities,
        }
    }

    fn record(&self, command: String, action_type: &str) -> AppResult<ActionAttempt> {
        self.commands.lock().unwrap().push(command);
        Ok(ActionAttempt {
            action_attempt_id: "aa_1".to_string(),
            action_type: action_type.to_string(),
            status: "pending".to_string(),
        })
    }
}

#[async_trait]
impl ThermostatActuator for FakeActuator {
    async fn list_devices(&self) -> AppResult<Vec<Device>> {
        Ok(vec![self.device()])
    }

    async fn get_device(&self, _device_id: &str) -> AppResult<Device> {
        Ok(self.device())
    }

    async fn cool(&self, _device_id: &str, set_point_f: f64) -> AppResult<ActionAttempt> {
        self.record(format!("cool {}", set_point_f), "SET_COOL")
    }

    async fn heat(&self, _device_id: &str, set_point_f: f64) -> AppResult<ActionAttempt> {
        self.record(format!("heat {}", set_point_f), "SET_HEAT")
    }

    async fn off(&self, _device_id: &str) -> AppResult<ActionAttempt> {
        self.record("off".to_string(), "SET_HVAC_MODE")
    }
}

struct FakeAudit {
    entries: Arc<Mutex<Vec<AuditLogEntry>>>,
    unavailable: bool,
}

#[async_trait]
impl AuditLog for FakeAudit {
    async fn append(&self, entry: &AuditLogEntry) -> AppResult<()> {
        if self.unavailable {
            return Err(AppError::upstream("audit log", "HTTP 503"));
        }
        self.entries.lock().unwrap().push(entry.clone());
        Ok(())
    }
}

struct Harness {
    app: Router,
    booking_calls: Arc<AtomicUsize>,
    weather_calls: Arc<AtomicUsize>,
    commands: Arc<Mutex<Vec<String>>>,
    audit: Arc<Mutex<Vec<AuditLogEntry>>>,
}

fn booking(status: &str, check_in: &str, check_out: &str) -> BookingRow {
    BookingRow {
        status: status.to_string(),
        check_in: check_in.to_string(),
        check_out: check_out.to_string(),
    }
}

fn full_caps() -> DeviceCapabilities {
    DeviceCapabilities {
        can_cool: true,
        can_heat: true,
        can_off: true,
    }
}

fn harness(rows: Vec<BookingRow>, temp_f: f64, capabilities: DeviceCapabilities) -> Harness {
    build_harness(rows, temp_f, capabilities, false)
}

fn build_harness(
    rows: Vec<BookingRow>,
    temp_f: f64,
    capabilities: DeviceCapabilities,
    audit_unavailable: bool,
) -> Harness {
    let booking_calls = Arc::new(AtomicUsize::new(0));
    let weather_calls = Arc::new(AtomicUsize::new(0));
    let commands = Arc::new(Mutex::new(Vec::new()));
    let audit = Arc::new(Mutex::new(Vec::new()));

    let now = NaiveDate::parse_from_str(TODAY, "%Y-%m-%d")
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap();

    let turnover = TurnoverService::new(
        Arc::new(FakeBookings {
            rows,
            calls: booking_calls.clone(),
        }),
        Arc::new(FakeWeather {
            temp_f,
            calls: weather_calls.clone(),
        }),
        ThermostatController::new(
            Arc::new(FakeActuator {
                capabilities,
                commands: commands.clone(),
            }),
            NICKNAME,
        ),
        Arc::new(FakeAudit {
            entries: audit.clone(),
            unavailable: audit_unavailable,
        }),
        Arc::new(FixedClock(now)),
    );

    let mut config = AppConfig::default();
    config.auth.webhook_token = TOKEN.to_string();

    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(Services::new(turnover)),
    };

    Harness {
        app: create_router(state),
        booking_calls,
        weather_calls,
        commands,
        audit,
    }
}

fn webhook(token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("POST").uri("/adjust-temp");
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

async fn call(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn test_health_check() {
    let h = harness(Vec::new(), 70.0, full_caps());
    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let (status, body) = call(h.app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["thermostat"], NICKNAME);
    assert_eq!(h.booking_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_missing_token_rejected_before_any_call() {
    let h = harness(vec![booking("accepted", TODAY, "2024-06-12")], 80.0, full_caps());

    let (status, body) = call(h.app, webhook(None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "NotAuthorized");
    assert_eq!(h.booking_calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.weather_calls.load(Ordering::SeqCst), 0);
    assert!(h.audit.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_wrong_token_rejected_before_any_call() {
    let h = harness(vec![booking("accepted", TODAY, "2024-06-12")], 80.0, full_caps());

    let (status, _) = call(h.app, webhook(Some("guess"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(h.booking_calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.weather_calls.load(Ordering::SeqCst), 0);
    assert!(h.commands.lock().unwrap().is_empty());
    assert!(h.audit.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_checkin_hot_day_cools_to_73() {
    let h = harness(
        vec![
            booking("accepted", TODAY, "2024-06-12"),
            booking("accepted", "2024-06-01", "2024-06-05"),
        ],
        80.0,
        full_caps(),
    );

    let (status, body) = call(h.app, webhook(Some(TOKEN))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "checkin_adjusted");
    assert_eq!(body["detail"]["action_type"], "SET_COOL");
    assert_eq!(*h.commands.lock().unwrap(), vec!["cool 73".to_string()]);

    let audit = h.audit.lock().unwrap();
    assert_eq!(audit.len(), 1);
    assert_eq!(audit[0].event_type, EventType::CheckIn);
    assert_eq!(audit[0].mode, Some(HvacMode::Cool));
    assert_eq!(audit[0].set_point_f, Some(73.0));
}

#[tokio::test]
async fn test_checkin_mild_day_sends_no_command() {
    let h = harness(vec![booking("Accepted", TODAY, "2024-06-12")], 70.0, full_caps());

    let (status, body) = call(h.app, webhook(Some(TOKEN))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "checkin_adjusted");
    assert_eq!(body["detail"]["status"], "no_temp_threshold_met_for_checkin");
    assert!(h.commands.lock().unwrap().is_empty());
    assert_eq!(h.audit.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_checkout_cold_day_heats_to_65() {
    let h = harness(vec![booking("accepted", "2024-06-07", TODAY)], 64.0, full_caps());

    let (status, body) = call(h.app, webhook(Some(TOKEN))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "checkout_adjusted");
    assert_eq!(*h.commands.lock().unwrap(), vec!["heat 65".to_string()]);
    assert_eq!(h.audit.lock().unwrap()[0].event_type, EventType::CheckOut);
}

#[tokio::test]
async fn test_checkout_mild_day_turns_off() {
    let h = harness(
        vec![booking("accepted", "2024-06-07", "2024-06-10 11:00 AM")],
        70.0,
        full_caps(),
    );

    let (status, body) = call(h.app, webhook(Some(TOKEN))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "checkout_adjusted");
    assert_eq!(*h.commands.lock().unwrap(), vec!["off".to_string()]);
}

#[tokio::test]
async fn test_same_day_turnover_uses_checkin_branch() {
    let h = harness(
        vec![
            booking("accepted", "2024-06-07", TODAY),
            booking("accepted", TODAY, "2024-06-14"),
        ],
        60.0,
        full_caps(),
    );

    let (_, body) = call(h.app, webhook(Some(TOKEN))).await;
    assert_eq!(body["status"], "checkin_adjusted");
    assert_eq!(*h.commands.lock().unwrap(), vec!["heat 70".to_string()]);
    assert_eq!(h.audit.lock().unwrap()[0].event_type, EventType::CheckIn);
}

#[tokio::test]
async fn test_no_event_day_logs_once() {
    let h = harness(
        vec![
            booking("accepted", "2024-06-01", "2024-06-05"),
            booking("cancelled", TODAY, "2024-06-12"),
        ],
        90.0,
        full_caps(),
    );

    let (status, body) = call(h.app, webhook(Some(TOKEN))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!({ "status": "no_action" }));
    assert!(h.commands.lock().unwrap().is_empty());

    let audit = h.audit.lock().unwrap();
    assert_eq!(audit.len(), 1);
    assert_eq!(audit[0].event_type, EventType::NoEvent);
    assert_eq!(audit[0].outdoor_temp_f, 90.0);
}

#[tokio::test]
async fn test_unsupported_mode_returns_error_detail() {
    let caps = DeviceCapabilities {
        can_cool: false,
        can_heat: true,
        can_off: true,
    };
    let h = harness(vec![booking("accepted", TODAY, "2024-06-12")], 85.0, caps);

    let (status, body) = call(h.app, webhook(Some(TOKEN))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "checkin_adjusted");
    assert_eq!(body["detail"]["code"], "unsupported_capability");
    assert!(h.commands.lock().unwrap().is_empty());

    let audit = h.audit.lock().unwrap();
    assert_eq!(audit.len(), 1);
    assert!(audit[0].notes.starts_with("error: "));
}

#[tokio::test]
async fn test_audit_log_outage_after_command_is_bad_gateway() {
    let h = build_harness(
        vec![booking("accepted", TODAY, "2024-06-12")],
        80.0,
        full_caps(),
        true,
    );

    let (status, body) = call(h.app, webhook(Some(TOKEN))).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "UpstreamFailure");
    // the thermostat keeps its new set point
    assert_eq!(*h.commands.lock().unwrap(), vec!["cool 73".to_string()]);
    assert!(h.audit.lock().unwrap().is_empty());
}
