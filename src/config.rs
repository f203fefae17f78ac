// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use chrono::FixedOffset;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::i18n::I18nStore,
    db::{LeadGateway, LeadRepository, SellerRepository, UserRepository},
    services::{
        analysis_service::{AnalysisService, GeminiClient, TextGenerator},
        auth::AuthService,
        dashboard_service::DashboardService,
        lead_service::LeadService,
        lead_store::LeadStore,
    },
};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
// Brasília (UTC-3)
const DEFAULT_UTC_OFFSET_MINUTES: i32 = -180;

/// Configuração lida do ambiente (e do `.env`, se existir).
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub dashboard_offset: FixedOffset,
    pub cors_allowed_origin: Option<String>,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        // Variável vazia conta como ausente
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = get("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = get("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let offset_minutes = match get("DASHBOARD_UTC_OFFSET_MINUTES") {
            Some(raw) => raw
                .trim()
                .parse::<i32>()
                .with_context(|| format!("DASHBOARD_UTC_OFFSET_MINUTES inválido: {raw}"))?,
            None => DEFAULT_UTC_OFFSET_MINUTES,
        };
        let dashboard_offset = FixedOffset::east_opt(offset_minutes * 60)
            .context("DASHBOARD_UTC_OFFSET_MINUTES fora do intervalo")?;

        Ok(Self {
            database_url,
            jwt_secret,
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            gemini_api_key: get("GEMINI_API_KEY"),
            gemini_model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            dashboard_offset,
            cors_allowed_origin: get("CORS_ALLOWED_ORIGIN"),
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub lead_store: LeadStore,
    pub lead_gateway: Arc<dyn LeadGateway>,
    pub lead_service: LeadService,
    pub dashboard_service: DashboardService,
    pub analysis_service: AnalysisService,
    pub auth_service: AuthService,
    pub seller_repo: SellerRepository,
    pub i18n_store: I18nStore,
}

impl AppState {
    pub async fn new(settings: &Settings) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&settings.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        let generator: Option<Arc<dyn TextGenerator>> = match &settings.gemini_api_key {
            Some(key) => Some(Arc::new(GeminiClient::new(
                key.clone(),
                settings.gemini_model.clone(),
            )?)),
            None => {
                tracing::warn!("GEMINI_API_KEY ausente; a análise de IA vai responder só o fallback");
                None
            }
        };

        let gateway: Arc<dyn LeadGateway> = Arc::new(LeadRepository::new(db_pool.clone()));
        Ok(Self::assemble(db_pool, gateway, generator, settings))
    }

    // --- Monta o gráfico de dependências ---
    pub fn assemble(
        db_pool: PgPool,
        lead_gateway: Arc<dyn LeadGateway>,
        generator: Option<Arc<dyn TextGenerator>>,
        settings: &Settings,
    ) -> Self {
        let lead_store = LeadStore::new();
        let user_repo = UserRepository::new(db_pool.clone());

        Self {
            lead_service: LeadService::new(lead_gateway.clone(), lead_store.clone()),
            dashboard_service: DashboardService::new(lead_store.clone(), settings.dashboard_offset),
            analysis_service: AnalysisService::new(generator),
            auth_service: AuthService::new(user_repo, settings.jwt_secret.clone()),
            seller_repo: SellerRepository::new(db_pool.clone()),
            i18n_store: I18nStore::new(),
            lead_store,
            lead_gateway,
            db_pool,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn defaults_are_applied() {
        let settings = Settings::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/manos"),
            ("JWT_SECRET", "segredo"),
        ]))
        .unwrap();

        assert_eq!(settings.bind_addr, "0.0.0.0:3000");
        assert_eq!(settings.gemini_model, "gemini-2.0-flash");
        assert_eq!(settings.gemini_api_key, None);
        assert_eq!(settings.dashboard_offset.local_minus_utc(), -3 * 3600);
        assert_eq!(settings.cors_allowed_origin, None);
    }

    #[test]
    fn missing_required_variables_fail() {
        assert!(Settings::from_lookup(lookup(&[("JWT_SECRET", "segredo")])).is_err());
        assert!(Settings::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/manos"),
            ("JWT_SECRET", "  "),
        ]))
        .is_err());
    }

    #[test]
    fn overrides_are_read() {
        let settings = Settings::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/manos"),
            ("JWT_SECRET", "segredo"),
            ("GEMINI_API_KEY", "chave"),
            ("DASHBOARD_UTC_OFFSET_MINUTES", "60"),
            ("BIND_ADDR", "127.0.0.1:8080"),
        ]))
        .unwrap();

        assert_eq!(settings.gemini_api_key.as_deref(), Some("chave"));
        assert_eq!(settings.dashboard_offset.local_minus_utc(), 3600);
        assert_eq!(settings.bind_addr, "127.0.0.1:8080");
    }

    #[test]
    fn invalid_offset_is_rejected() {
        let result = Settings::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/manos"),
            ("JWT_SECRET", "segredo"),
            ("DASHBOARD_UTC_OFFSET_MINUTES", "menos tres"),
        ]));
        assert!(result.is_err());
    }
}
