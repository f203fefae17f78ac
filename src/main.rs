//src/main.rs

use axum::http::HeaderValue;
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::EnvFilter;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod routes;
mod services;
#[cfg(test)]
mod test_support;

use crate::{
    config::{AppState, Settings},
    services::change_feed::ChangeFeed,
};

fn cors_layer(settings: &Settings) -> CorsLayer {
    let allow_origin = match settings
        .cors_allowed_origin
        .as_deref()
        .and_then(|origin| HeaderValue::from_str(origin.trim()).ok())
    {
        Some(origin) => AllowOrigin::exact(origin),
        None => AllowOrigin::any(),
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Falha ao escutar o sinal de desligamento: {}", e);
    }
    tracing::info!("Sinal de desligamento recebido");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let settings = Settings::from_env()?;
    let app_state = AppState::new(&settings).await?;

    // Faz o app rodar as migrações do SQLx na inicialização
    sqlx::migrate!().run(&app_state.db_pool).await?;
    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // A carga inicial acontece dentro da tarefa do feed, já com o LISTEN ativo.
    let change_feed = ChangeFeed::connect(
        &app_state.db_pool,
        app_state.lead_store.clone(),
        app_state.lead_gateway.clone(),
    )
    .await?;

    let app = routes::app_router(app_state)
        .layer(cors_layer(&settings))
        .layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(&settings.bind_addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    change_feed.dispose();
    Ok(())
}
