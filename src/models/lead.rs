// src/models/lead.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;
use std::fmt;
use utoipa::ToSchema;
use validator::Validate;

// Nome da tabela remota e sentinelas de exibição
pub const LEADS_TABLE: &str = "leads_facebook_2026";
pub const DEFAULT_ORIGEM: &str = "Facebook Ads";
pub const SEM_VENDEDOR: &str = "Sem Vendedor";
pub const AGUARDANDO: &str = "AGUARDANDO";

// --- IDENTIFICADOR ---

/// Identificador opaco do lead.
///
/// Pelo feed chega como número (`row_to_json` de um BIGSERIAL); pelas queries
/// chega como texto. Os dois viram a mesma string, e a identidade é a igualdade
/// dessa string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = String, example = "42")]
pub struct LeadId(pub String);

impl<'de> Deserialize<'de> for LeadId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(i64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => LeadId(s),
            RawId::Number(n) => LeadId(n.to_string()),
        })
    }
}

impl fmt::Display for LeadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LeadId {
    fn from(value: &str) -> Self {
        LeadId(value.to_string())
    }
}

// --- STATUS ---

/// Etapas do funil de vendas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
pub enum LeadStatus {
    #[default]
    Novo,
    Respondeu,
    #[serde(rename = "Não Respondeu")]
    NaoRespondeu,
    #[serde(rename = "Score Baixo")]
    ScoreBaixo,
    #[serde(rename = "Em Negociação")]
    EmNegociacao,
    #[serde(rename = "Pedido de Compra")]
    PedidoDeCompra,
    Vendido,
    Perdido,
}

impl LeadStatus {
    /// Ordem das colunas do kanban e das opções de filtro.
    pub const ALL: [LeadStatus; 8] = [
        LeadStatus::Novo,
        LeadStatus::Respondeu,
        LeadStatus::NaoRespondeu,
        LeadStatus::ScoreBaixo,
        LeadStatus::EmNegociacao,
        LeadStatus::PedidoDeCompra,
        LeadStatus::Vendido,
        LeadStatus::Perdido,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::Novo => "Novo",
            LeadStatus::Respondeu => "Respondeu",
            LeadStatus::NaoRespondeu => "Não Respondeu",
            LeadStatus::ScoreBaixo => "Score Baixo",
            LeadStatus::EmNegociacao => "Em Negociação",
            LeadStatus::PedidoDeCompra => "Pedido de Compra",
            LeadStatus::Vendido => "Vendido",
            LeadStatus::Perdido => "Perdido",
        }
    }

    /// Rótulo amigável mostrado para o vendedor.
    pub fn friendly_label(&self) -> &'static str {
        match self {
            LeadStatus::Novo => "Novo Contato",
            LeadStatus::Respondeu => "Já Conversou",
            LeadStatus::NaoRespondeu => "Não Atende",
            LeadStatus::ScoreBaixo => "Pouco Interesse",
            LeadStatus::EmNegociacao => "Em Negociação",
            LeadStatus::PedidoDeCompra => "Quase Vendido",
            LeadStatus::Vendido => "Venda Feita!",
            LeadStatus::Perdido => "Desistiu",
        }
    }

    /// Conversão estrita (usada em escritas).
    pub fn parse(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == label)
    }

    /// Conversão tolerante (usada em leituras): vazio ou desconhecido vira `Novo`.
    pub fn from_label_or_default(label: Option<&str>) -> Self {
        label.and_then(Self::parse).unwrap_or_default()
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn status_or_default<'de, D>(deserializer: D) -> Result<LeadStatus, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(LeadStatus::from_label_or_default(raw.as_ref().and_then(Value::as_str)))
}

fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

// --- LEAD ---

/// Espelho de uma linha de `leads_facebook_2026`.
///
/// Os nomes dos campos seguem as colunas da tabela, porque o merge do feed de
/// mudanças aplica os campos da linha por nome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Lead {
    pub id: LeadId,

    #[serde(default, deserialize_with = "string_or_empty")]
    #[schema(example = "Luiz Carlos Santos")]
    pub nome: String,

    #[serde(default)]
    #[schema(example = "Wilson")]
    pub vendedor: Option<String>,

    #[serde(default, deserialize_with = "status_or_default")]
    pub status: LeadStatus,

    pub created_at: DateTime<Utc>,

    #[serde(default)]
    pub last_interaction_at: Option<DateTime<Utc>>,

    #[serde(default)]
    #[schema(example = "Facebook Ads")]
    pub origem: Option<String>,

    #[serde(default)]
    #[schema(example = "Toyota Corolla 2024")]
    pub carro_interesse: Option<String>,

    #[serde(default)]
    #[schema(example = "R$ 150.000 - R$ 180.000")]
    pub faixa_preco: Option<String>,

    #[serde(default)]
    pub observacoes: Option<String>,
}

impl Lead {
    /// Vendedor atribuído, se houver (string vazia conta como sem vendedor).
    pub fn assigned_seller(&self) -> Option<&str> {
        self.vendedor.as_deref().filter(|v| !v.is_empty())
    }

    /// Balde de agrupamento por vendedor.
    pub fn seller_bucket(&self) -> &str {
        self.assigned_seller().unwrap_or(SEM_VENDEDOR)
    }

    /// Rótulo da coluna "vendedor" na tabela.
    pub fn vendedor_label(&self) -> &str {
        self.assigned_seller().unwrap_or(AGUARDANDO)
    }

    pub fn origem_or_default(&self) -> &str {
        self.origem
            .as_deref()
            .filter(|o| !o.is_empty())
            .unwrap_or(DEFAULT_ORIGEM)
    }

    /// Merge raso: cada campo presente em `patch` substitui o atual; os ausentes
    /// ficam intactos. O `id` nunca muda.
    pub fn merged_with(&self, patch: &Map<String, Value>) -> Result<Lead, serde_json::Error> {
        let Value::Object(mut current) = serde_json::to_value(self)? else {
            return Ok(self.clone());
        };

        for (key, value) in patch {
            if key == "id" {
                continue;
            }
            current.insert(key.clone(), value.clone());
        }

        serde_json::from_value(Value::Object(current))
    }
}

/// Linha crua vinda do Postgres. `id` é lido como texto (`id::text`), seja qual
/// for o tipo da coluna.
#[derive(Debug, FromRow)]
pub struct LeadRow {
    pub id: String,
    pub nome: Option<String>,
    pub vendedor: Option<String>,
    pub status: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_interaction_at: Option<DateTime<Utc>>,
    pub origem: Option<String>,
    pub carro_interesse: Option<String>,
    pub faixa_preco: Option<String>,
    pub observacoes: Option<String>,
}

impl From<LeadRow> for Lead {
    fn from(row: LeadRow) -> Self {
        Lead {
            id: LeadId(row.id),
            nome: row.nome.unwrap_or_default(),
            vendedor: row.vendedor,
            status: LeadStatus::from_label_or_default(row.status.as_deref()),
            created_at: row.created_at,
            last_interaction_at: row.last_interaction_at,
            origem: row.origem,
            carro_interesse: row.carro_interesse,
            faixa_preco: row.faixa_preco,
            observacoes: row.observacoes,
        }
    }
}

// --- ESCRITA ---

/// Alterações parciais de um lead (salvar ficha ou mudança rápida de status).
/// String vazia em campo opcional limpa a coluna.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct LeadChanges {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Luiz Carlos Santos")]
    pub nome: Option<String>,

    #[schema(example = "Wilson")]
    pub vendedor: Option<String>,

    pub status: Option<LeadStatus>,

    #[schema(example = "Toyota Corolla 2024")]
    pub carro_interesse: Option<String>,

    #[schema(example = "R$ 150.000 - R$ 180.000")]
    pub faixa_preco: Option<String>,

    pub observacoes: Option<String>,
}

impl LeadChanges {
    pub fn status_only(status: LeadStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct QuickStatusPayload {
    pub status: LeadStatus,
}

// --- LEITURA (API) ---

/// Lead com os rótulos de exibição já resolvidos.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LeadView {
    #[serde(flatten)]
    pub lead: Lead,
    #[schema(example = "Novo Contato")]
    pub status_label: String,
    #[schema(example = "AGUARDANDO")]
    pub vendedor_label: String,
    #[schema(example = "Facebook Ads")]
    pub origem_label: String,
}

impl From<Lead> for LeadView {
    fn from(lead: Lead) -> Self {
        let status_label = lead.status.friendly_label().to_string();
        let vendedor_label = lead.vendedor_label().to_string();
        let origem_label = lead.origem_or_default().to_string();
        Self {
            lead,
            status_label,
            vendedor_label,
            origem_label,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct KanbanColumn {
    pub status: LeadStatus,
    #[schema(example = "Quase Vendido")]
    pub label: String,
    pub total: usize,
    pub leads: Vec<LeadView>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LeadAnalysis {
    pub lead_id: LeadId,
    pub text: String,
    /// `true` quando o texto é a mensagem fixa de erro, não uma análise.
    pub fallback: bool,
}
