//! Dashboard headline numbers.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;

use super::{or_fallback, today};
use crate::fallback;
use crate::state::DashboardState;
use crate::types::DashboardStats;

/// Handle GET /api/dashboard/stats.
///
/// All four reads must succeed for live numbers; if any fails the whole
/// answer comes from the fallback data set.
pub async fn get_stats(State(state): State<Arc<DashboardState>>) -> Json<DashboardStats> {
    let today = today();
    let storage = state.storage();

    let live = tokio::try_join!(
        storage.beds(),
        storage.appointments_on(today),
        storage.donors(),
        storage.unread_alerts(),
    )
    .map(|(beds, appointments, donors, alerts)| {
        DashboardStats::tally(&beds, &appointments, &donors, &alerts)
    });

    Json(or_fallback("dashboard-stats", live, || fallback::stats(today)))
}
