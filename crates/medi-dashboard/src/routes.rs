//! Route configuration for the dashboard API.

use std::sync::Arc;

use axum::routing::{get, patch, post, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::DashboardConfig;
use crate::handlers::{
    alerts, appointments, beds, chatbot, doctors, donors, health_check, patients, stats, wards,
};
use crate::state::DashboardState;
use crate::websocket::ws_upgrade;

/// Create the dashboard API router.
pub fn create_router(state: Arc<DashboardState>) -> Router {
    let cors = build_cors_layer(state.config());

    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/dashboard/stats", get(stats::get_stats))
        // Beds and wards
        .route("/beds", get(beds::list_beds).post(beds::create_bed))
        .route("/beds/by-ward/{ward_id}", get(beds::list_beds_by_ward))
        .route("/beds/{id}", get(beds::get_bed))
        .route("/beds/{id}/status", patch(beds::update_bed_status))
        .route("/wards", get(wards::list_wards).post(wards::create_ward))
        .route("/wards/{id}", get(wards::get_ward))
        // Appointments
        .route(
            "/appointments",
            get(appointments::list_appointments).post(appointments::create_appointment),
        )
        .route("/appointments/today", get(appointments::list_todays_appointments))
        .route("/appointments/{id}", get(appointments::get_appointment))
        .route(
            "/appointments/{id}/status",
            patch(appointments::update_appointment_status),
        )
        // Staff and patients
        .route("/doctors", get(doctors::list_doctors).post(doctors::create_doctor))
        .route(
            "/doctors/department/{department}",
            get(doctors::list_doctors_by_department),
        )
        .route("/doctors/{id}", get(doctors::get_doctor))
        .route(
            "/doctors/{id}/availability",
            patch(doctors::set_doctor_availability),
        )
        .route(
            "/patients",
            get(patients::list_patients).post(patients::create_patient),
        )
        .route(
            "/patients/{id}",
            get(patients::get_patient).patch(patients::update_patient),
        )
        // Organ donors
        .route(
            "/organ-donors",
            get(donors::list_donors).post(donors::create_donor),
        )
        .route("/organ-donors/{id}", get(donors::get_donor))
        .route("/organ-donors/{id}/status", patch(donors::update_donor_status))
        // Alerts
        .route("/alerts", get(alerts::list_alerts).post(alerts::create_alert))
        .route("/alerts/unread", get(alerts::list_unread_alerts))
        .route("/alerts/{id}", get(alerts::get_alert))
        .route("/alerts/{id}/read", patch(alerts::mark_alert_read))
        // Chatbot
        .route("/chatbot/message", post(chatbot::send_message))
        .route("/chatbot/messages/{session_id}", get(chatbot::list_messages))
        .route("/chatbot/analyze-symptoms", post(chatbot::analyze_symptoms));

    Router::new()
        .nest("/api", api_routes)
        .route("/ws", get(ws_upgrade))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Build the CORS layer based on configuration.
fn build_cors_layer(config: &DashboardConfig) -> CorsLayer {
    if config.cors_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use http_body_util::BodyExt;
    use medi_assistant::Assistant;
    use medi_store::Storage;
    use tower::ServiceExt;

    use crate::fallback;

    fn memory_state() -> Arc<DashboardState> {
        Arc::new(DashboardState::new(
            DashboardConfig::default(),
            Storage::memory(fallback::snapshot().clone()),
            Assistant::Offline,
        ))
    }

    fn offline_state() -> Arc<DashboardState> {
        Arc::new(DashboardState::new(
            DashboardConfig::default(),
            Storage::Unavailable,
            Assistant::Offline,
        ))
    }

    async fn send(
        state: Arc<DashboardState>,
        method: Method,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let app = create_router(state);
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let (status, json) = send(memory_state(), Method::GET, "/api/health", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert_eq!(json["storageAvailable"], true);
        assert_eq!(json["storageBackend"], "memory");
        assert_eq!(json["assistantConfigured"], false);
    }

    #[tokio::test]
    async fn test_health_reports_missing_storage() {
        let (status, json) = send(offline_state(), Method::GET, "/api/health", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["storageAvailable"], false);
        assert_eq!(json["storageBackend"], "none");
    }

    #[tokio::test]
    async fn test_beds_endpoint_joins_wards() {
        let (status, json) = send(memory_state(), Method::GET, "/api/beds", None).await;

        assert_eq!(status, StatusCode::OK);
        let rows = json.as_array().unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0]["ward"]["name"], "General Ward");
        assert_eq!(rows[0]["bedNumber"], "101");
    }

    #[tokio::test]
    async fn test_beds_status_filter() {
        let (status, json) =
            send(memory_state(), Method::GET, "/api/beds?status=occupied", None).await;

        assert_eq!(status, StatusCode::OK);
        let rows = json.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r["status"] == "occupied"));
    }

    #[tokio::test]
    async fn test_beds_invalid_status_filter() {
        let (status, json) =
            send(memory_state(), Method::GET, "/api/beds?status=broken", None).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "invalid_request");
    }

    #[tokio::test]
    async fn test_bed_not_found() {
        let uri = format!("/api/beds/{}", uuid::Uuid::new_v4());
        let (status, _) = send(memory_state(), Method::GET, &uri, None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_malformed_id_is_bad_request() {
        let (status, json) = send(memory_state(), Method::GET, "/api/doctors/12", None).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["message"].as_str().unwrap().contains("invalid doctor ID"));
    }

    #[tokio::test]
    async fn test_appointments_today_route_is_not_an_id() {
        let (status, json) =
            send(memory_state(), Method::GET, "/api/appointments/today", None).await;

        assert_eq!(status, StatusCode::OK);
        assert!(json.is_array());
    }

    #[tokio::test]
    async fn test_unfiltered_appointments_are_detailed() {
        let (status, json) = send(memory_state(), Method::GET, "/api/appointments", None).await;

        assert_eq!(status, StatusCode::OK);
        let rows = json.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].get("patient").is_some());
        assert!(rows[0].get("doctor").is_some());
    }

    #[tokio::test]
    async fn test_filtered_appointments_are_plain() {
        let (status, json) = send(
            memory_state(),
            Method::GET,
            "/api/appointments?date=2024-01-15",
            None,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let rows = json.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].get("patient").is_none());
        assert!(rows[0]["appointmentDate"].as_str().unwrap() < rows[1]["appointmentDate"].as_str().unwrap());
    }

    #[tokio::test]
    async fn test_malformed_json_body_is_bad_request() {
        let app = create_router(memory_state());
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/wards")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let (status, _) = send(memory_state(), Method::GET, "/api/nothing-here", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_cors_layer_with_origins() {
        let config = DashboardConfig::default()
            .with_cors_origin("http://localhost:5173")
            .with_cors_origin("not a header value\n");
        let _layer = build_cors_layer(&config);
    }
}
