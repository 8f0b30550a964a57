use axum::{extract::State, Json};

use crate::adapters::inbound::http::{
    dto::{OrphanDto, SweepReportDto},
    router::AppState,
};

/// List photos awaiting cleanup
pub async fn list_orphans(State(app_state): State<AppState>) -> Json<Vec<OrphanDto>> {
    let orphans = app_state.item_service.pending_orphans().await;

    Json(orphans.into_iter().map(OrphanDto::from).collect())
}

/// Retry deletion of every pending orphan
pub async fn sweep_orphans(State(app_state): State<AppState>) -> Json<SweepReportDto> {
    Json(app_state.item_service.sweep_orphans().await.into())
}
