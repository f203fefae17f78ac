use std::collections::HashMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::{common::i18n::I18nStore, middleware::i18n::Locale, models::lead::LeadId};

// Nosso tipo de erro de domínio. O texto para o usuário sai do I18nStore via `code()`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Lead {0} não encontrado")]
    LeadNotFound(LeadId),

    #[error("Evento de mudança inválido: {0}")]
    InvalidChangePayload(String),

    #[error("Assistente de IA não configurado")]
    AiNotConfigured,

    #[error("Falha na chamada ao assistente de IA: {0}")]
    AiRequest(#[from] reqwest::Error),

    #[error("Resposta inesperada do assistente de IA: {0}")]
    AiResponse(String),

    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    /// Chave do catálogo de mensagens.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "validation_error",
            AppError::InvalidCredentials => "invalid_credentials",
            AppError::InvalidToken => "invalid_token",
            AppError::LeadNotFound(_) => "lead_not_found",
            AppError::InvalidChangePayload(_) => "invalid_change_payload",
            AppError::AiNotConfigured | AppError::AiRequest(_) | AppError::AiResponse(_) => {
                "ai_unavailable"
            }
            _ => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::InvalidChangePayload(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::LeadNotFound(_) => StatusCode::NOT_FOUND,
            AppError::AiNotConfigured => StatusCode::SERVICE_UNAVAILABLE,
            AppError::AiRequest(_) | AppError::AiResponse(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Converte para a resposta HTTP no idioma do cliente.
    pub fn to_api_error(&self, locale: &Locale, i18n: &I18nStore) -> ApiError {
        let status = self.status();
        if status.is_server_error() {
            // O detalhe técnico fica só no log.
            tracing::error!("Erro Interno do Servidor: {}", self);
        }

        let details = match self {
            AppError::ValidationError(errors) => {
                let mut details: HashMap<String, Vec<String>> = HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages = field_errors
                        .iter()
                        .map(|e| {
                            let key: &str = e.message.as_deref().unwrap_or(&e.code);
                            i18n.translate(&locale.0, key)
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                Some(json!(details))
            }
            _ => None,
        };

        ApiError {
            status,
            error: i18n.translate(&locale.0, self.code()),
            details,
        }
    }
}

/// Rejeição HTTP padrão: `{ "error": ..., "details": ... }`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}
