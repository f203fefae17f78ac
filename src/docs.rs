// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,

        // --- Users ---
        handlers::auth::get_me,

        // --- Dashboard ---
        handlers::dashboard::get_overview,

        // --- Leads ---
        handlers::leads::list_leads,
        handlers::leads::get_kanban,
        handlers::leads::get_seller_options,
        handlers::leads::get_lead,
        handlers::leads::update_lead,
        handlers::leads::update_status,
        handlers::leads::analyze_lead,

        // --- Vendedores ---
        handlers::sellers::list_sellers,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,
            models::auth::CurrentUser,

            // --- Dashboard ---
            models::dashboard::DashboardOverview,
            models::dashboard::DashboardStats,
            models::dashboard::ChartEntry,
            models::dashboard::SellerPerformance,

            // --- Leads ---
            models::lead::LeadId,
            models::lead::LeadStatus,
            models::lead::Lead,
            models::lead::LeadView,
            models::lead::LeadChanges,
            models::lead::QuickStatusPayload,
            models::lead::KanbanColumn,
            models::lead::LeadAnalysis,

            // --- Vendedores ---
            models::seller::Vendedor,
            models::seller::SellerOptions,
        )
    ),
    tags(
        (name = "Auth", description = "Login da equipe"),
        (name = "Users", description = "Dados do usuário logado"),
        (name = "Dashboard", description = "Indicadores, alertas e gráficos"),
        (name = "Leads", description = "Clientes do Facebook Ads: lista, kanban, ficha e assistente"),
        (name = "Vendedores", description = "Equipe de vendas cadastrada")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
