//! The availability gate and the storage adapter facade.
//!
//! [`Storage`] is decided once at startup: either a backend handle exists or
//! it does not. Every operation checks the gate first, validates its input,
//! then dispatches to the backend. Ids and timestamps are assigned here, so
//! both backends store identical records.

use chrono::{NaiveDate, Utc};
use medi_model::{
    Alert, AlertId, Appointment, AppointmentDetails, AppointmentId, AppointmentQuery,
    AppointmentStatus, Bed, BedId, BedStatus, BedStatusChange, BedWithWard, ChatMessage,
    ChatMessageId, Doctor, DoctorId, DonorId, DonorQuery, DonorStatus, ModelError, NewAlert,
    NewAppointment, NewBed, NewChatMessage, NewDoctor, NewDonor, NewPatient, NewWard, OrganDonor,
    Patient, PatientId, PatientUpdate, Snapshot, Ward, WardId,
};
use tracing::{info, warn};

use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::memory::MemoryStore;
use crate::postgres::PgStore;

/// A live storage backend.
#[derive(Debug, Clone)]
pub enum Backend {
    /// PostgreSQL through a connection pool.
    Postgres(PgStore),
    /// Tables held in process memory.
    Memory(MemoryStore),
}

/// Storage handle, shared by every request.
#[derive(Debug, Clone)]
pub enum Storage {
    /// A backend was constructed at startup.
    Connected(Backend),
    /// No backend; every operation fails with [`StoreError::Unavailable`].
    Unavailable,
}

macro_rules! dispatch {
    ($self:ident.$method:ident($($arg:expr),* $(,)?)) => {
        match $self.backend()? {
            Backend::Postgres(store) => store.$method($($arg),*).await,
            Backend::Memory(store) => store.$method($($arg),*),
        }
    };
}

impl Storage {
    /// Build storage from configuration.
    ///
    /// A missing or unparsable connection string yields
    /// [`Storage::Unavailable`]. The pool connects lazily, so a configured but
    /// unreachable server still yields `Connected`; its operations then fail
    /// with [`StoreError::Unavailable`].
    pub async fn connect(config: &StoreConfig) -> Self {
        let Some(url) = config.url() else {
            warn!("no database url configured, serving fallback data");
            return Self::Unavailable;
        };
        let store = match PgStore::connect_lazy(url, &config.pool) {
            Ok(store) => store,
            Err(err) => {
                warn!(error = %err, "database unavailable, serving fallback data");
                return Self::Unavailable;
            }
        };
        if config.init_schema {
            if let Err(err) = store.init_schema().await {
                warn!(error = %err, "failed to apply database schema");
            }
        }
        info!("storage connected to postgres");
        Self::Connected(Backend::Postgres(store))
    }

    /// In-memory storage seeded with `snapshot`.
    #[must_use]
    pub fn memory(snapshot: Snapshot) -> Self {
        Self::Connected(Backend::Memory(MemoryStore::with_snapshot(snapshot)))
    }

    /// The availability gate: true iff a backend handle exists.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        matches!(self, Self::Connected(_))
    }

    /// Short name of the active backend, for health reporting.
    #[must_use]
    pub const fn backend_name(&self) -> &'static str {
        match self {
            Self::Connected(Backend::Postgres(_)) => "postgres",
            Self::Connected(Backend::Memory(_)) => "memory",
            Self::Unavailable => "none",
        }
    }

    fn backend(&self) -> StoreResult<&Backend> {
        match self {
            Self::Connected(backend) => Ok(backend),
            Self::Unavailable => Err(StoreError::unavailable("no database configured")),
        }
    }

    /// Check the backend can answer a query.
    pub async fn ping(&self) -> StoreResult<()> {
        match self.backend()? {
            Backend::Postgres(store) => store.ping().await,
            Backend::Memory(_) => Ok(()),
        }
    }

    /// Release backend resources.
    pub async fn close(&self) {
        if let Self::Connected(Backend::Postgres(store)) = self {
            store.close().await;
        }
    }

    // ==================== Doctors ====================

    /// Get a doctor by id.
    pub async fn doctor(&self, id: DoctorId) -> StoreResult<Option<Doctor>> {
        dispatch!(self.doctor(id))
    }

    /// All doctors, by name.
    pub async fn doctors(&self) -> StoreResult<Vec<Doctor>> {
        dispatch!(self.doctors())
    }

    /// Doctors of exactly one department, by name.
    pub async fn doctors_by_department(&self, department: &str) -> StoreResult<Vec<Doctor>> {
        dispatch!(self.doctors_by_department(department))
    }

    /// Register a doctor.
    pub async fn create_doctor(&self, new: NewDoctor) -> StoreResult<Doctor> {
        self.backend()?;
        new.validate()?;
        let doctor = new.into_doctor(DoctorId::new(), Utc::now());
        dispatch!(self.insert_doctor(&doctor))
    }

    /// Mark a doctor available or unavailable.
    pub async fn set_doctor_availability(&self, id: DoctorId, available: bool) -> StoreResult<Doctor> {
        dispatch!(self.set_doctor_availability(id, available))
    }

    // ==================== Patients ====================

    /// Get a patient by id.
    pub async fn patient(&self, id: PatientId) -> StoreResult<Option<Patient>> {
        dispatch!(self.patient(id))
    }

    /// All patients, by last then first name.
    pub async fn patients(&self) -> StoreResult<Vec<Patient>> {
        dispatch!(self.patients())
    }

    /// Admit a patient.
    pub async fn create_patient(&self, new: NewPatient) -> StoreResult<Patient> {
        self.backend()?;
        new.validate(today())?;
        let patient = new.into_patient(PatientId::new(), Utc::now());
        dispatch!(self.insert_patient(&patient))
    }

    /// Change some of a patient's details.
    pub async fn update_patient(&self, id: PatientId, update: PatientUpdate) -> StoreResult<Patient> {
        self.backend()?;
        update.validate(today())?;
        dispatch!(self.update_patient(id, &update))
    }

    // ==================== Wards ====================

    /// Get a ward by id.
    pub async fn ward(&self, id: WardId) -> StoreResult<Option<Ward>> {
        dispatch!(self.ward(id))
    }

    /// All wards, by name.
    pub async fn wards(&self) -> StoreResult<Vec<Ward>> {
        dispatch!(self.wards())
    }

    /// Open a ward.
    pub async fn create_ward(&self, new: NewWard) -> StoreResult<Ward> {
        self.backend()?;
        new.validate()?;
        let ward = new.into_ward(WardId::new(), Utc::now());
        dispatch!(self.insert_ward(&ward))
    }

    // ==================== Beds ====================

    /// Get a bed by id.
    pub async fn bed(&self, id: BedId) -> StoreResult<Option<Bed>> {
        dispatch!(self.bed(id))
    }

    /// All beds, by bed number.
    pub async fn beds(&self) -> StoreResult<Vec<Bed>> {
        dispatch!(self.beds())
    }

    /// Beds of one ward.
    pub async fn beds_by_ward(&self, ward_id: WardId) -> StoreResult<Vec<Bed>> {
        dispatch!(self.beds_by_ward(ward_id))
    }

    /// Beds in one status.
    pub async fn beds_by_status(&self, status: BedStatus) -> StoreResult<Vec<Bed>> {
        dispatch!(self.beds_by_status(status))
    }

    /// Every bed with its ward, by ward name then bed number.
    pub async fn beds_with_ward(&self) -> StoreResult<Vec<BedWithWard>> {
        dispatch!(self.beds_with_ward())
    }

    /// Add a bed to a ward.
    pub async fn create_bed(&self, new: NewBed) -> StoreResult<Bed> {
        self.backend()?;
        new.validate()?;
        let bed = new.into_bed(BedId::new(), Utc::now());
        dispatch!(self.insert_bed(&bed))
    }

    /// Occupy or release a bed, stamping `lastUpdated`.
    pub async fn update_bed_status(&self, id: BedId, change: BedStatusChange) -> StoreResult<Bed> {
        self.backend()?;
        change.validate()?;
        let now = Utc::now();
        dispatch!(self.update_bed_status(id, &change, now))
    }

    // ==================== Appointments ====================

    /// Get an appointment by id.
    pub async fn appointment(&self, id: AppointmentId) -> StoreResult<Option<Appointment>> {
        dispatch!(self.appointment(id))
    }

    /// All appointments, most recent first.
    pub async fn appointments(&self) -> StoreResult<Vec<Appointment>> {
        self.appointments_matching(AppointmentQuery::default()).await
    }

    /// Appointments on one UTC day, earliest first.
    pub async fn appointments_on(&self, date: NaiveDate) -> StoreResult<Vec<Appointment>> {
        self.appointments_matching(AppointmentQuery::on(date)).await
    }

    /// Appointments with one doctor, most recent first.
    pub async fn appointments_by_doctor(&self, doctor_id: DoctorId) -> StoreResult<Vec<Appointment>> {
        self.appointments_matching(AppointmentQuery::for_doctor(doctor_id)).await
    }

    /// Appointments for one patient, most recent first.
    pub async fn appointments_by_patient(&self, patient_id: PatientId) -> StoreResult<Vec<Appointment>> {
        self.appointments_matching(AppointmentQuery::for_patient(patient_id)).await
    }

    /// Appointments matching every criterion of `query`.
    pub async fn appointments_matching(&self, query: AppointmentQuery) -> StoreResult<Vec<Appointment>> {
        dispatch!(self.appointments_matching(&query))
    }

    /// Every appointment with its patient and doctor, most recent first.
    pub async fn appointments_with_details(&self) -> StoreResult<Vec<AppointmentDetails>> {
        dispatch!(self.appointments_with_details())
    }

    /// Book an appointment. Status defaults to `scheduled`.
    pub async fn create_appointment(&self, new: NewAppointment) -> StoreResult<Appointment> {
        self.backend()?;
        new.validate()?;
        let appointment = new.into_appointment(AppointmentId::new(), Utc::now());
        dispatch!(self.insert_appointment(&appointment))
    }

    /// Move an appointment to `status`, if the transition is allowed.
    pub async fn update_appointment_status(
        &self,
        id: AppointmentId,
        status: AppointmentStatus,
    ) -> StoreResult<Appointment> {
        dispatch!(self.update_appointment_status(id, status))
    }

    // ==================== Organ donors ====================

    /// Get a donor by id.
    pub async fn donor(&self, id: DonorId) -> StoreResult<Option<OrganDonor>> {
        dispatch!(self.donor(id))
    }

    /// All donors, most recently updated first.
    pub async fn donors(&self) -> StoreResult<Vec<OrganDonor>> {
        self.search_donors(DonorQuery::default()).await
    }

    /// Donors matching `query`. Blank criteria are ignored.
    pub async fn search_donors(&self, query: DonorQuery) -> StoreResult<Vec<OrganDonor>> {
        let query = query.normalized();
        dispatch!(self.search_donors(&query))
    }

    /// Register a donor.
    pub async fn create_donor(&self, new: NewDonor) -> StoreResult<OrganDonor> {
        self.backend()?;
        new.validate()?;
        let donor = new.into_donor(DonorId::new(), Utc::now());
        dispatch!(self.insert_donor(&donor))
    }

    /// Move a donor to `status`, if the transition is allowed.
    pub async fn update_donor_status(&self, id: DonorId, status: DonorStatus) -> StoreResult<OrganDonor> {
        let now = Utc::now();
        dispatch!(self.update_donor_status(id, status, now))
    }

    // ==================== Alerts ====================

    /// Get an alert by id.
    pub async fn alert(&self, id: AlertId) -> StoreResult<Option<Alert>> {
        dispatch!(self.alert(id))
    }

    /// All alerts, newest first.
    pub async fn alerts(&self) -> StoreResult<Vec<Alert>> {
        dispatch!(self.alerts())
    }

    /// Unread alerts, newest first.
    pub async fn unread_alerts(&self) -> StoreResult<Vec<Alert>> {
        dispatch!(self.unread_alerts())
    }

    /// Raise an alert.
    pub async fn create_alert(&self, new: NewAlert) -> StoreResult<Alert> {
        self.backend()?;
        new.validate()?;
        let alert = new.into_alert(AlertId::new(), Utc::now());
        dispatch!(self.insert_alert(&alert))
    }

    /// Mark an alert read. Repeating the call changes nothing.
    pub async fn mark_alert_read(&self, id: AlertId) -> StoreResult<Alert> {
        dispatch!(self.mark_alert_read(id))
    }

    // ==================== Chat ====================

    /// One conversation, oldest turn first.
    pub async fn chat_messages(&self, session_id: &str) -> StoreResult<Vec<ChatMessage>> {
        if session_id.trim().is_empty() {
            return Err(ModelError::validation("sessionId", "must not be empty").into());
        }
        dispatch!(self.chat_messages(session_id))
    }

    /// Record a conversation turn.
    pub async fn create_chat_message(&self, new: NewChatMessage) -> StoreResult<ChatMessage> {
        self.backend()?;
        new.validate()?;
        let message = new.into_message(ChatMessageId::new(), Utc::now());
        dispatch!(self.insert_chat_message(&message))
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}
