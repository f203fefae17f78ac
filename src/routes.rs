// src/routes.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, patch, post},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, handlers, middleware::auth::auth_guard};

pub fn app_router(app_state: AppState) -> Router {
    // Rotas de autenticação (públicas)
    let auth_routes = Router::new().route("/login", post(handlers::auth::login));

    // Tudo abaixo exige JWT
    let protected = Router::new()
        .route("/users/me", get(handlers::auth::get_me))
        .route("/dashboard", get(handlers::dashboard::get_overview))
        .route("/leads", get(handlers::leads::list_leads))
        .route("/leads/kanban", get(handlers::leads::get_kanban))
        .route("/leads/sellers", get(handlers::leads::get_seller_options))
        .route(
            "/leads/{id}",
            get(handlers::leads::get_lead).put(handlers::leads::update_lead),
        )
        .route("/leads/{id}/status", patch(handlers::leads::update_status))
        .route("/leads/{id}/analysis", post(handlers::leads::analyze_lead))
        .route("/vendedores", get(handlers::sellers::list_sellers))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let api = Router::new()
        .route("/health", get(|| async { "OK" }))
        .nest("/auth", auth_routes)
        .merge(protected);

    Router::new()
        .nest("/api", api)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state)
}
