// src/services/analysis_service.rs

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::{
    common::error::AppError,
    models::lead::{Lead, LeadAnalysis},
};

pub const FALLBACK_CALL_FAILED: &str = "Houve um erro ao chamar o assistente.";
pub const FALLBACK_EMPTY: &str = "O assistente não conseguiu analisar agora.";

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Modelo de texto. `Ok("")` significa "respondeu, mas sem conteúdo".
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, AppError>;
}

/// Cliente da API `generateContent` do Gemini.
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String) -> Result<Self, AppError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            api_key,
            model,
            base_url: GEMINI_BASE_URL.to_string(),
        })
    }
}

/// Junta o texto de todas as partes do primeiro candidato.
pub fn extract_text(response: &Value) -> String {
    response
        .get("candidates")
        .and_then(|c| c.get(0))
        .and_then(|candidate| candidate.get("content"))
        .and_then(|content| content.get("parts"))
        .and_then(Value::as_array)
        .map(|parts| {
            parts
                .iter()
                .filter_map(|part| part.get("text").and_then(Value::as_str))
                .collect::<String>()
        })
        .unwrap_or_default()
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, AppError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let request_body = json!({
            "contents": [{
                "parts": [{ "text": prompt }]
            }]
        });

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::AiResponse(format!("status {status}: {error_text}")));
        }

        let body = response.json::<Value>().await?;
        Ok(extract_text(&body))
    }
}

fn or_not_informed(value: Option<&str>) -> &str {
    value.filter(|v| !v.trim().is_empty()).unwrap_or("não informado")
}

pub fn build_prompt(lead: &Lead) -> String {
    format!(
        r#"Você está ajudando um vendedor de carros. Seja direto e curto.
1. Estime a chance de fechar a venda (0 a 100%).
2. Dê duas ações práticas para o próximo contato.
3. Sugira uma mensagem curta de WhatsApp para o cliente.

CLIENTE:
Nome: {}
Carro de interesse: {}
Quanto quer pagar: {}
Anotações: {}
Etapa atual: {}"#,
        or_not_informed(Some(&lead.nome)),
        or_not_informed(lead.carro_interesse.as_deref()),
        or_not_informed(lead.faixa_preco.as_deref()),
        or_not_informed(lead.observacoes.as_deref()),
        lead.status,
    )
}

/// Assistente de vendas. Nunca falha para quem chama: qualquer problema vira
/// uma das mensagens fixas, com `fallback = true`.
#[derive(Clone, Default)]
pub struct AnalysisService {
    generator: Option<Arc<dyn TextGenerator>>,
}

impl AnalysisService {
    pub fn new(generator: Option<Arc<dyn TextGenerator>>) -> Self {
        Self { generator }
    }

    pub async fn analyze(&self, lead: &Lead) -> LeadAnalysis {
        let result = match &self.generator {
            Some(generator) => generator.generate(&build_prompt(lead)).await,
            None => Err(AppError::AiNotConfigured),
        };

        let (text, fallback) = match result {
            Ok(text) if !text.trim().is_empty() => (text, false),
            Ok(_) => (FALLBACK_EMPTY.to_string(), true),
            Err(e) => {
                tracing::warn!(lead_id = %lead.id, "Falha na análise do assistente: {}", e);
                (FALLBACK_CALL_FAILED.to_string(), true)
            }
        };

        LeadAnalysis {
            lead_id: lead.id.clone(),
            text,
            fallback,
        }
    }
}
