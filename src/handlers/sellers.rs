// src/handlers/sellers.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{config::AppState, models::seller::Vendedor};

// GET /api/vendedores
#[utoipa::path(
    get,
    path = "/api/vendedores",
    tag = "Vendedores",
    responses(
        (status = 200, description = "Vendedores cadastrados; lista vazia se a consulta falhar", body = Vec<Vendedor>)
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn list_sellers(State(app_state): State<AppState>) -> impl IntoResponse {
    let sellers = app_state.seller_repo.list().await.unwrap_or_else(|e| {
        tracing::error!("🔥 Erro ao buscar vendedores: {}", e);
        Vec::new()
    });

    (StatusCode::OK, Json(sellers))
}
