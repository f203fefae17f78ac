// src/handlers/dashboard.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{config::AppState, models::dashboard::DashboardOverview};

// GET /api/dashboard
#[utoipa::path(
    get,
    path = "/api/dashboard",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Indicadores do dia, alertas e gráficos", body = DashboardOverview),
        (status = 401, description = "Não autorizado")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn get_overview(State(app_state): State<AppState>) -> impl IntoResponse {
    let overview = app_state.dashboard_service.get_overview().await;
    (StatusCode::OK, Json(overview))
}
