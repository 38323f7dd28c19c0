//! Storage contract tests against a live PostgreSQL server.
//!
//! Run with `DATABASE_URL=postgres://... cargo test -p medi-store -- --ignored`.
//! The schema is created on connect. Tests share the database, so each one
//! tags its records and only looks at what it created.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use medi_model::{
    AlertSeverity, AppointmentStatus, BedStatus, BedStatusChange, DonorQuery, DonorStatus,
    NewAlert, NewAppointment, NewBed, NewDoctor, NewDonor, NewPatient, NewWard,
};
use medi_store::{Storage, StoreConfig, StoreError};
use test_case::test_case;

async fn connect() -> Storage {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let storage = Storage::connect(&StoreConfig::new(url).with_init_schema(true)).await;
    assert_eq!(storage.backend_name(), "postgres");
    storage
}

fn tag() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2031, 3, day, hour, 0, 0).unwrap()
}

fn new_doctor(name: &str) -> NewDoctor {
    NewDoctor {
        name: name.into(),
        specialization: "Neurology".into(),
        department: "Neurology".into(),
        license_number: format!("LIC-{}", tag()),
        phone_number: None,
        available: true,
    }
}

fn new_patient(first: &str) -> NewPatient {
    NewPatient {
        first_name: first.into(),
        last_name: tag(),
        ..NewPatient::default()
    }
}

fn new_donor(name: &str, blood: &str, organs: &[String]) -> NewDonor {
    NewDonor {
        name: name.into(),
        blood_type: blood.into(),
        organs: organs.to_vec(),
        status: None,
        contact_phone: None,
    }
}

#[tokio::test]
#[ignore = "requires PostgreSQL at DATABASE_URL"]
async fn test_doctor_ordering_and_department_filter() {
    let storage = connect().await;
    let department = format!("Dept-{}", tag());
    let mut ids = HashSet::new();
    for name in ["dr. zed", "Dr. Amy", "Dr. Bob"] {
        let doctor = storage
            .create_doctor(NewDoctor {
                department: department.clone(),
                ..new_doctor(name)
            })
            .await
            .unwrap();
        ids.insert(doctor.id);
    }

    let names: Vec<_> = storage
        .doctors()
        .await
        .unwrap()
        .into_iter()
        .filter(|d| ids.contains(&d.id))
        .map(|d| d.name)
        .collect();
    assert_eq!(names, ["Dr. Amy", "Dr. Bob", "dr. zed"]);

    assert_eq!(storage.doctors_by_department(&department).await.unwrap().len(), 3);
    let lower = department.to_lowercase();
    assert!(storage.doctors_by_department(&lower).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "requires PostgreSQL at DATABASE_URL"]
async fn test_donor_search() {
    let storage = connect().await;
    let suffix = tag();
    let kidney = format!("Kidney-{suffix}");
    let heart = format!("Heart-{suffix}");
    let robert = storage
        .create_donor(new_donor("Robert Brown", "O+", &[kidney.clone()]))
        .await
        .unwrap();
    storage
        .create_donor(new_donor("Sam Lee", "O+", &[heart]))
        .await
        .unwrap();
    storage
        .create_donor(new_donor("Lisa Wang", "A-", &[kidney]))
        .await
        .unwrap();

    let fragment = format!("kidney-{suffix}");
    let hits = storage
        .search_donors(DonorQuery::new(Some("O+"), Some(fragment.as_str())))
        .await
        .unwrap();
    let ids: Vec<_> = hits.iter().map(|d| d.id).collect();
    assert_eq!(ids, [robert.id]);

    let by_organ = storage
        .search_donors(DonorQuery::new(None, Some(fragment.to_uppercase().as_str())))
        .await
        .unwrap();
    assert_eq!(by_organ.len(), 2);
    assert!(by_organ.windows(2).all(|w| w[0].last_updated >= w[1].last_updated));
}

#[tokio::test]
#[ignore = "requires PostgreSQL at DATABASE_URL"]
async fn test_bed_status_partition_and_ward_join() {
    let storage = connect().await;
    let ward = storage
        .create_ward(NewWard {
            name: format!("ICU {}", tag()),
            department: "Critical Care".into(),
            capacity: 8,
        })
        .await
        .unwrap();
    let mut beds = Vec::new();
    for number in ["ICU-2", "ICU-1"] {
        let bed = storage
            .create_bed(NewBed {
                ward_id: ward.id,
                bed_number: number.into(),
                equipment: vec!["Ventilator".into()],
                notes: None,
            })
            .await
            .unwrap();
        beds.push(bed);
    }
    let patient = storage.create_patient(new_patient("Mike")).await.unwrap();

    let in_ward: Vec<_> = storage
        .beds_by_ward(ward.id)
        .await
        .unwrap()
        .into_iter()
        .map(|b| b.bed_number)
        .collect();
    assert_eq!(in_ward, ["ICU-1", "ICU-2"]);

    let before = beds[1].last_updated;
    let occupied = storage
        .update_bed_status(beds[1].id, BedStatusChange::occupy(patient.id, true))
        .await
        .unwrap();
    assert_eq!(occupied.status, BedStatus::Occupied);
    assert!(occupied.critical);
    assert!(occupied.last_updated >= before);

    let ours = |list: Vec<medi_model::Bed>| -> Vec<_> {
        list.into_iter().filter(|b| b.ward_id == ward.id).map(|b| b.id).collect()
    };
    let taken = ours(storage.beds_by_status(BedStatus::Occupied).await.unwrap());
    let free = ours(storage.beds_by_status(BedStatus::Available).await.unwrap());
    assert_eq!(taken, [beds[1].id]);
    assert_eq!(free, [beds[0].id]);

    let joined: Vec<_> = storage
        .beds_with_ward()
        .await
        .unwrap()
        .into_iter()
        .filter(|b| b.ward.id == ward.id)
        .collect();
    assert_eq!(joined.len(), 2);
    assert!(joined.iter().all(|b| b.ward.name == ward.name));

    let released = storage
        .update_bed_status(beds[1].id, BedStatusChange::release())
        .await
        .unwrap();
    assert_eq!(released.patient_id, None);
    assert!(!released.critical);
}

#[tokio::test]
#[ignore = "requires PostgreSQL at DATABASE_URL"]
async fn test_bed_references_and_second_bed() {
    let storage = connect().await;
    let err = storage
        .create_bed(NewBed {
            ward_id: medi_model::WardId::new(),
            bed_number: "101".into(),
            equipment: vec![],
            notes: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::MissingReference { .. }), "{err}");

    let ward = storage
        .create_ward(NewWard {
            name: format!("General {}", tag()),
            department: "General Medicine".into(),
            capacity: 20,
        })
        .await
        .unwrap();
    let mut beds = Vec::new();
    for number in ["101", "102"] {
        let bed = storage
            .create_bed(NewBed {
                ward_id: ward.id,
                bed_number: number.into(),
                equipment: vec![],
                notes: None,
            })
            .await
            .unwrap();
        beds.push(bed.id);
    }

    let err = storage
        .update_bed_status(beds[0], BedStatusChange::occupy(medi_model::PatientId::new(), false))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::MissingReference { .. }), "{err}");

    let patient = storage.create_patient(new_patient("Jane")).await.unwrap();
    storage
        .update_bed_status(beds[0], BedStatusChange::occupy(patient.id, false))
        .await
        .unwrap();
    let err = storage
        .update_bed_status(beds[1], BedStatusChange::occupy(patient.id, false))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Conflict { .. }), "{err}");
    let untouched = storage.bed(beds[1]).await.unwrap().unwrap();
    assert_eq!(untouched.status, BedStatus::Available);

    let err = storage
        .update_bed_status(medi_model::BedId::new(), BedStatusChange::release())
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound { .. }), "{err}");
}

#[tokio::test]
#[ignore = "requires PostgreSQL at DATABASE_URL"]
async fn test_appointment_day_window_and_details() {
    let storage = connect().await;
    let doctor = storage.create_doctor(new_doctor("Dr. Amy")).await.unwrap();
    let patient = storage.create_patient(new_patient("John")).await.unwrap();
    for (day, hour) in [(15, 14), (15, 0), (16, 0), (14, 23)] {
        storage
            .create_appointment(NewAppointment {
                patient_id: patient.id,
                doctor_id: doctor.id,
                appointment_date: at(day, hour),
                duration: 30,
                status: None,
                reason: None,
                notes: None,
            })
            .await
            .unwrap();
    }

    let by_patient = storage.appointments_by_patient(patient.id).await.unwrap();
    let dates: Vec<_> = by_patient.iter().map(|a| a.appointment_date).collect();
    assert_eq!(dates, [at(16, 0), at(15, 14), at(15, 0), at(14, 23)]);
    assert_eq!(storage.appointments_by_doctor(doctor.id).await.unwrap(), by_patient);

    let day = NaiveDate::from_ymd_opt(2031, 3, 15).unwrap();
    let on_day: Vec<_> = storage
        .appointments_on(day)
        .await
        .unwrap()
        .into_iter()
        .filter(|a| a.patient_id == patient.id)
        .map(|a| a.appointment_date)
        .collect();
    assert_eq!(on_day, [at(15, 0), at(15, 14)]);

    let details: Vec<_> = storage
        .appointments_with_details()
        .await
        .unwrap()
        .into_iter()
        .filter(|d| d.patient.id == patient.id)
        .collect();
    assert_eq!(details.len(), 4);
    assert!(details.iter().all(|d| d.doctor.name == "Dr. Amy"));

    let err = storage
        .create_appointment(NewAppointment {
            patient_id: medi_model::PatientId::new(),
            doctor_id: doctor.id,
            appointment_date: at(15, 9),
            duration: 30,
            status: None,
            reason: None,
            notes: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::MissingReference { .. }), "{err}");
}

#[test_case(AppointmentStatus::Confirmed, true ; "scheduled to confirmed")]
#[test_case(AppointmentStatus::Cancelled, true ; "scheduled to cancelled")]
#[test_case(AppointmentStatus::Pending, false ; "back to pending")]
#[tokio::test]
#[ignore = "requires PostgreSQL at DATABASE_URL"]
async fn test_appointment_transition(next: AppointmentStatus, allowed: bool) {
    let storage = connect().await;
    let doctor = storage.create_doctor(new_doctor("Dr. Chen")).await.unwrap();
    let patient = storage.create_patient(new_patient("Jane")).await.unwrap();
    let booked = storage
        .create_appointment(NewAppointment {
            patient_id: patient.id,
            doctor_id: doctor.id,
            appointment_date: at(20, 11),
            duration: 30,
            status: None,
            reason: None,
            notes: None,
        })
        .await
        .unwrap();

    let result = storage.update_appointment_status(booked.id, next).await;
    if allowed {
        assert_eq!(result.unwrap().status, next);
    } else {
        assert!(matches!(result, Err(StoreError::InvalidTransition { .. })));
        let unchanged = storage.appointment(booked.id).await.unwrap().unwrap();
        assert_eq!(unchanged.status, AppointmentStatus::Scheduled);
    }
}

#[tokio::test]
#[ignore = "requires PostgreSQL at DATABASE_URL"]
async fn test_donor_transitions() {
    let storage = connect().await;
    let donor = storage
        .create_donor(NewDonor {
            status: Some(DonorStatus::Pending),
            ..new_donor("Lisa Wang", "A-", &[format!("Liver-{}", tag())])
        })
        .await
        .unwrap();

    let matched = storage.update_donor_status(donor.id, DonorStatus::Matched).await.unwrap();
    assert_eq!(matched.status, DonorStatus::Matched);
    assert!(matched.last_updated >= donor.last_updated);

    let err = storage
        .update_donor_status(donor.id, DonorStatus::Available)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidTransition { .. }), "{err}");
    let unchanged = storage.donor(donor.id).await.unwrap().unwrap();
    assert_eq!(unchanged.status, DonorStatus::Matched);
    assert_eq!(unchanged.last_updated, matched.last_updated);
}

#[tokio::test]
#[ignore = "requires PostgreSQL at DATABASE_URL"]
async fn test_mark_alert_read_is_idempotent() {
    let storage = connect().await;
    let alert = storage
        .create_alert(NewAlert {
            message: format!("Patient needs attention {}", tag()),
            severity: AlertSeverity::Warning,
        })
        .await
        .unwrap();
    let unread = storage.unread_alerts().await.unwrap();
    assert!(unread.iter().any(|a| a.id == alert.id));

    let first = storage.mark_alert_read(alert.id).await.unwrap();
    let second = storage.mark_alert_read(alert.id).await.unwrap();
    assert_eq!(first, second);
    assert!(second.is_read);
    assert!(!storage.unread_alerts().await.unwrap().iter().any(|a| a.id == alert.id));

    let err = storage
        .mark_alert_read(medi_model::AlertId::new())
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound { .. }), "{err}");
}
