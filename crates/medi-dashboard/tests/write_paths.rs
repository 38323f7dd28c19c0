//! Mutations against a working store, and the updates they publish.

mod helpers;

use axum::http::StatusCode;
use helpers::*;
use medi_dashboard::fallback;
use serde_json::json;

#[tokio::test]
async fn test_bed_occupy_and_release() {
    let server = memory_server();
    let mut viewer = subscribe(&server);
    let snapshot = fallback::snapshot();
    let bed = snapshot.beds[0].id;
    let patient = snapshot.patients[0].id;

    let (status, json) = patch(
        &server,
        &format!("/api/beds/{bed}/status"),
        json!({"status": "occupied", "patientId": patient, "critical": true}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "occupied");
    assert_eq!(json["patientId"], json!(patient));
    assert_eq!(json["critical"], true);

    let update = next_update(&mut viewer).unwrap();
    assert_eq!(update["type"], "bedStatusUpdate");
    assert_eq!(update["data"], json);

    let (_, occupied) = get(&server, "/api/beds?status=occupied").await;
    let (_, available) = get(&server, "/api/beds?status=available").await;
    assert_eq!(occupied.as_array().unwrap().len(), 3);
    assert_eq!(available.as_array().unwrap().len(), 1);

    let (status, json) = patch(
        &server,
        &format!("/api/beds/{bed}/status"),
        json!({"status": "available"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["patientId"], json!(null));
    assert_eq!(json["critical"], false);
    assert_eq!(next_update(&mut viewer).unwrap()["data"]["status"], "available");
}

#[tokio::test]
async fn test_bed_occupancy_rules_are_enforced() {
    let server = memory_server();
    let mut viewer = subscribe(&server);
    let bed = fallback::snapshot().beds[0].id;
    let uri = format!("/api/beds/{bed}/status");

    let (status, json) = patch(&server, &uri, json!({"status": "occupied"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "validation_failed");

    let (status, json) = patch(
        &server,
        &uri,
        json!({"status": "occupied", "patientId": uuid::Uuid::new_v4()}),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["error"], "missing_reference");

    let (status, _) = patch(&server, &uri, json!({"status": "reserved"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert!(next_update(&mut viewer).is_none());
    let (_, bed) = get(&server, &format!("/api/beds/{bed}")).await;
    assert_eq!(bed["status"], "available");
}

#[tokio::test]
async fn test_patient_cannot_take_second_bed() {
    let server = memory_server();
    let mut viewer = subscribe(&server);
    let snapshot = fallback::snapshot();
    let free_bed = snapshot.beds[0].id;
    let jane = snapshot.beds[1].patient_id.unwrap();

    let (status, json) = patch(
        &server,
        &format!("/api/beds/{free_bed}/status"),
        json!({"status": "occupied", "patientId": jane}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"], "conflict");

    assert!(next_update(&mut viewer).is_none());
    let (_, bed) = get(&server, &format!("/api/beds/{free_bed}")).await;
    assert_eq!(bed["status"], "available");
    assert_eq!(bed["patientId"], json!(null));
}

#[tokio::test]
async fn test_unknown_bed_update_is_not_found() {
    let server = memory_server();
    let (status, json) = patch(
        &server,
        &format!("/api/beds/{}/status", uuid::Uuid::new_v4()),
        json!({"status": "available"}),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "not_found");
}

#[tokio::test]
async fn test_create_bed_in_unknown_ward() {
    let server = memory_server();
    let (status, _) = post(
        &server,
        "/api/beds",
        json!({"wardId": uuid::Uuid::new_v4(), "bedNumber": "999"}),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let ward = fallback::snapshot().wards[2].id;
    let (status, json) = post(
        &server,
        "/api/beds",
        json!({"wardId": ward, "bedNumber": "P-1", "equipment": ["Monitor"]}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["status"], "available");

    let (_, beds) = get(&server, &format!("/api/beds/by-ward/{ward}")).await;
    assert_eq!(beds.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_book_appointment() {
    let server = memory_server();
    let mut viewer = subscribe(&server);
    let snapshot = fallback::snapshot();
    let patient = snapshot.patients[2].id;
    let doctor = snapshot.doctors[1].id;

    let (status, json) = post(
        &server,
        "/api/appointments",
        json!({
            "patientId": patient,
            "doctorId": doctor,
            "appointmentDate": "2024-01-16T14:00:00Z",
            "reason": "Follow-up"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["status"], "scheduled");
    assert_eq!(json["duration"], 30);

    let update = next_update(&mut viewer).unwrap();
    assert_eq!(update["type"], "newAppointment");
    assert_eq!(update["data"]["id"], json["id"]);

    let (_, listed) = get(&server, &format!("/api/appointments?patientId={patient}")).await;
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["reason"], "Follow-up");
}

#[tokio::test]
async fn test_book_appointment_with_unknown_doctor() {
    let server = memory_server();
    let mut viewer = subscribe(&server);
    let patient = fallback::snapshot().patients[0].id;

    let (status, json) = post(
        &server,
        "/api/appointments",
        json!({
            "patientId": patient,
            "doctorId": uuid::Uuid::new_v4(),
            "appointmentDate": "2024-01-16T14:00:00Z"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(json["message"].as_str().unwrap().contains("doctor"));
    assert!(next_update(&mut viewer).is_none());
}

#[tokio::test]
async fn test_appointment_status_transitions() {
    let server = memory_server();
    let mut viewer = subscribe(&server);
    let appointment = fallback::snapshot().appointments[0].id;
    let uri = format!("/api/appointments/{appointment}/status");

    let (status, json) = patch(&server, &uri, json!({"status": "confirmed"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "confirmed");
    assert_eq!(next_update(&mut viewer).unwrap()["type"], "appointmentStatusUpdate");

    let (status, json) = patch(&server, &uri, json!({"status": "scheduled"})).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"], "invalid_transition");
    assert!(next_update(&mut viewer).is_none());

    let (_, current) = get(&server, &format!("/api/appointments/{appointment}")).await;
    assert_eq!(current["status"], "confirmed");

    let (status, _) = patch(&server, &uri, json!({"status": "cancelled"})).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = patch(&server, &uri, json!({"status": "confirmed"})).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_register_and_match_donor() {
    let server = memory_server();
    let mut viewer = subscribe(&server);

    let (status, donor) = post(
        &server,
        "/api/organ-donors",
        json!({"name": "Tom Reed", "bloodType": "O+", "organs": ["Kidney", "Heart"]}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(donor["status"], "available");
    assert_eq!(next_update(&mut viewer).unwrap()["type"], "newDonor");

    let (_, found) = get(&server, "/api/organ-donors?bloodType=O%2B&organType=kidney").await;
    let names: Vec<&str> = found
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Tom Reed", "Robert Brown"]);

    let id = donor["id"].as_str().unwrap();
    let uri = format!("/api/organ-donors/{id}/status");
    let (status, matched) = patch(&server, &uri, json!({"status": "matched"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(matched["status"], "matched");
    assert_eq!(next_update(&mut viewer).unwrap()["type"], "donorStatusUpdate");

    let (status, _) = patch(&server, &uri, json!({"status": "available"})).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_donor_with_bad_blood_type() {
    let server = memory_server();
    let (status, json) = post(
        &server,
        "/api/organ-donors",
        json!({"name": "Tom Reed", "bloodType": "Q+", "organs": ["Kidney"]}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["message"].as_str().unwrap().contains("bloodType"));
}

#[tokio::test]
async fn test_alerts_lifecycle() {
    let server = memory_server();
    let mut viewer = subscribe(&server);

    let (status, alert) = post(
        &server,
        "/api/alerts",
        json!({"message": "Oxygen supply low in ICU", "severity": "critical"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(alert["isRead"], false);
    let update = next_update(&mut viewer).unwrap();
    assert_eq!(update["type"], "newAlert");
    assert_eq!(update["data"]["severity"], "critical");

    let (_, unread) = get(&server, "/api/alerts/unread").await;
    assert_eq!(unread.as_array().unwrap().len(), 2);
    assert_eq!(unread[0]["id"], alert["id"]);

    let uri = format!("/api/alerts/{}/read", alert["id"].as_str().unwrap());
    for _ in 0..2 {
        let (status, json) = patch(&server, &uri, json!({})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["isRead"], true);
    }

    let (_, unread) = get(&server, "/api/alerts/unread").await;
    assert_eq!(unread.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_alert_severity_defaults_to_info() {
    let server = memory_server();
    let (status, alert) = post(&server, "/api/alerts", json!({"message": "Drill at 3pm"})).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(alert["severity"], "info");
}

#[tokio::test]
async fn test_patient_partial_update() {
    let server = memory_server();
    let patient = &fallback::snapshot().patients[0];
    let uri = format!("/api/patients/{}", patient.id);

    let (status, json) = patch(&server, &uri, json!({"condition": "Recovering"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["condition"], "Recovering");
    assert_eq!(json["firstName"], patient.first_name.as_str());
    assert_eq!(json["lastName"], patient.last_name.as_str());

    let (status, json) = patch(&server, &uri, json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "validation_failed");
}

#[tokio::test]
async fn test_register_staff_and_wards() {
    let server = memory_server();

    let (status, doctor) = post(
        &server,
        "/api/doctors",
        json!({
            "name": "Dr. Ada Park",
            "specialization": "Oncology",
            "department": "Oncology",
            "licenseNumber": "MD-9001"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(doctor["available"], true);

    let uri = format!("/api/doctors/{}/availability", doctor["id"].as_str().unwrap());
    let (status, doctor) = patch(&server, &uri, json!({"available": false})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(doctor["available"], false);

    let (_, oncology) = get(&server, "/api/doctors/department/Oncology").await;
    assert_eq!(oncology.as_array().unwrap().len(), 1);

    let (status, _) = post(
        &server,
        "/api/wards",
        json!({"name": "Maternity", "department": "Obstetrics", "capacity": 0}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, ward) = post(
        &server,
        "/api/wards",
        json!({"name": "Maternity", "department": "Obstetrics", "capacity": 10}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = get(&server, &format!("/api/wards/{}", ward["id"].as_str().unwrap())).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_chat_history_records_both_turns() {
    let server = memory_server();

    let (status, reply) = post(
        &server,
        "/api/chatbot/message",
        json!({"message": "emergency", "sessionId": "ward-7"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        reply["message"],
        "For emergencies, please call 911 or visit the nearest emergency room."
    );

    let (status, history) = get(&server, "/api/chatbot/messages/ward-7").await;
    assert_eq!(status, StatusCode::OK);
    let history = history.as_array().unwrap();
    assert_eq!(history.len(), 2);
    assert!(history[0]["timestamp"].as_str() <= history[1]["timestamp"].as_str());
    let turn = |is_user: bool| {
        history
            .iter()
            .find(|m| m["isUser"] == is_user)
            .map(|m| m["message"].clone())
            .unwrap()
    };
    assert_eq!(turn(true), "emergency");
    assert_eq!(turn(false), reply["message"]);

    let (_, other) = get(&server, "/api/chatbot/messages/ward-8").await;
    assert!(other.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_chat_rejects_blank_message() {
    let server = memory_server();
    let (status, _) = post(
        &server,
        "/api/chatbot/message",
        json!({"message": "", "sessionId": "ward-7"}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_stats_follow_writes() {
    let server = memory_server();
    let bed = fallback::snapshot().beds[3].id;

    let (_, before) = get(&server, "/api/dashboard/stats").await;
    assert_eq!(before["availableBeds"], 2);
    assert_eq!(before["emergencyCases"], 1);

    let patient = fallback::snapshot().patients[0].id;
    patch(
        &server,
        &format!("/api/beds/{bed}/status"),
        json!({"status": "occupied", "patientId": patient, "critical": true}),
    )
    .await;

    let (status, after) = get(&server, "/api/dashboard/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(after["availableBeds"], 1);
    assert_eq!(after["occupiedBeds"], 3);
    assert_eq!(after["totalBeds"], 4);
    assert_eq!(after["emergencyCases"], 2);
}
