// src/handlers/leads.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::{
        lead::{KanbanColumn, LeadAnalysis, LeadChanges, LeadId, LeadView, QuickStatusPayload},
        seller::SellerOptions,
    },
    services::lead_filter::LeadFilter,
};

// GET /api/leads
#[utoipa::path(
    get,
    path = "/api/leads",
    tag = "Leads",
    params(LeadFilter),
    responses(
        (status = 200, description = "Clientes filtrados, mais recentes primeiro", body = Vec<LeadView>),
        (status = 401, description = "Não autorizado")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn list_leads(
    State(app_state): State<AppState>,
    Query(filter): Query<LeadFilter>,
) -> impl IntoResponse {
    let leads: Vec<LeadView> = app_state
        .lead_service
        .list(&filter)
        .await
        .into_iter()
        .map(LeadView::from)
        .collect();

    (StatusCode::OK, Json(leads))
}

// GET /api/leads/kanban
#[utoipa::path(
    get,
    path = "/api/leads/kanban",
    tag = "Leads",
    params(LeadFilter),
    responses(
        (status = 200, description = "Uma coluna por etapa do funil", body = Vec<KanbanColumn>)
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn get_kanban(
    State(app_state): State<AppState>,
    Query(filter): Query<LeadFilter>,
) -> impl IntoResponse {
    let columns = app_state.lead_service.kanban(&filter).await;
    (StatusCode::OK, Json(columns))
}

// GET /api/leads/sellers
#[utoipa::path(
    get,
    path = "/api/leads/sellers",
    tag = "Leads",
    responses(
        (status = 200, description = "Opções do filtro de vendedor", body = SellerOptions)
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn get_seller_options(State(app_state): State<AppState>) -> impl IntoResponse {
    let options = app_state.lead_service.seller_options().await;
    (StatusCode::OK, Json(SellerOptions { options }))
}

// GET /api/leads/{id}
#[utoipa::path(
    get,
    path = "/api/leads/{id}",
    tag = "Leads",
    params(
        ("id" = String, Path, description = "ID do lead")
    ),
    responses(
        (status = 200, description = "Ficha do cliente", body = LeadView),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn get_lead(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let lead = app_state
        .lead_service
        .get(&LeadId(id))
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(LeadView::from(lead))))
}

// PUT /api/leads/{id}
#[utoipa::path(
    put,
    path = "/api/leads/{id}",
    tag = "Leads",
    request_body = LeadChanges,
    params(
        ("id" = String, Path, description = "ID do lead")
    ),
    responses(
        (status = 200, description = "Ficha salva", body = LeadView),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn update_lead(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<String>,
    Json(payload): Json<LeadChanges>,
) -> Result<impl IntoResponse, ApiError> {
    let lead = app_state
        .lead_service
        .update_lead(&LeadId(id), payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    tracing::debug!(user = %user.email, lead_id = %lead.id, "Ficha salva");
    Ok((StatusCode::OK, Json(LeadView::from(lead))))
}

// PATCH /api/leads/{id}/status
#[utoipa::path(
    patch,
    path = "/api/leads/{id}/status",
    tag = "Leads",
    request_body = QuickStatusPayload,
    params(
        ("id" = String, Path, description = "ID do lead")
    ),
    responses(
        (status = 200, description = "Status alterado", body = LeadView),
        (status = 404, description = "Cliente não encontrado"),
        (status = 422, description = "Status desconhecido")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn update_status(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<String>,
    Json(payload): Json<QuickStatusPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let lead = app_state
        .lead_service
        .update_status(&LeadId(id), payload.status)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    tracing::debug!(user = %user.email, lead_id = %lead.id, "Status alterado");
    Ok((StatusCode::OK, Json(LeadView::from(lead))))
}

// POST /api/leads/{id}/analysis
#[utoipa::path(
    post,
    path = "/api/leads/{id}/analysis",
    tag = "Leads",
    params(
        ("id" = String, Path, description = "ID do lead")
    ),
    responses(
        (status = 200, description = "Análise do assistente (ou mensagem fixa de falha)", body = LeadAnalysis),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn analyze_lead(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let lead = app_state
        .lead_service
        .get(&LeadId(id))
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let analysis = app_state.analysis_service.analyze(&lead).await;
    Ok((StatusCode::OK, Json(analysis)))
}
