// src/db/lead_repo.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::{
    common::error::AppError,
    models::lead::{Lead, LeadChanges, LeadId, LeadRow, LEADS_TABLE},
};

// `id::text` entrega o identificador como texto opaco; o filtro por id usa o
// BIGSERIAL direto, para cair no índice da chave primária.
const LEAD_COLUMNS: &str = "id::text AS id, nome, vendedor, status, created_at, \
    last_interaction_at, origem, carro_interesse, faixa_preco, observacoes";

/// Acesso à tabela remota de leads. O LeadStore e o LeadService só conhecem
/// este trait.
#[async_trait]
pub trait LeadGateway: Send + Sync {
    /// Todas as linhas, mais recentes primeiro.
    async fn fetch_all(&self) -> Result<Vec<Lead>, AppError>;

    async fn fetch_one(&self, id: &LeadId) -> Result<Option<Lead>, AppError>;

    /// Atualização parcial, gravando `last_interaction_at` na mesma escrita.
    /// Devolve a linha como ficou no banco.
    async fn update(
        &self,
        id: &LeadId,
        changes: &LeadChanges,
        interaction_at: DateTime<Utc>,
    ) -> Result<Lead, AppError>;
}

#[derive(Clone)]
pub struct LeadRepository {
    pool: PgPool,
}

impl LeadRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LeadGateway for LeadRepository {
    async fn fetch_all(&self) -> Result<Vec<Lead>, AppError> {
        let sql = format!("SELECT {LEAD_COLUMNS} FROM {LEADS_TABLE} ORDER BY created_at DESC");

        let rows = sqlx::query_as::<_, LeadRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Lead::from).collect())
    }

    async fn fetch_one(&self, id: &LeadId) -> Result<Option<Lead>, AppError> {
        let Some(key) = row_key(id) else {
            return Ok(None);
        };
        let sql = format!("SELECT {LEAD_COLUMNS} FROM {LEADS_TABLE} WHERE id = $1");

        let row = sqlx::query_as::<_, LeadRow>(&sql)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Lead::from))
    }

    async fn update(
        &self,
        id: &LeadId,
        changes: &LeadChanges,
        interaction_at: DateTime<Utc>,
    ) -> Result<Lead, AppError> {
        let key = row_key(id).ok_or_else(|| AppError::LeadNotFound(id.clone()))?;
        let mut qb = build_update(key, changes, interaction_at);

        let row = qb
            .build_query_as::<LeadRow>()
            .fetch_optional(&self.pool)
            .await?;

        row.map(Lead::from)
            .ok_or_else(|| AppError::LeadNotFound(id.clone()))
    }
}

/// Chave da linha. Id que não é número não existe na tabela.
fn row_key(id: &LeadId) -> Option<i64> {
    id.0.trim().parse().ok()
}

fn build_update(
    key: i64,
    changes: &LeadChanges,
    interaction_at: DateTime<Utc>,
) -> QueryBuilder<'static, Postgres> {
    let mut qb: QueryBuilder<'static, Postgres> =
        QueryBuilder::new(format!("UPDATE {LEADS_TABLE} SET last_interaction_at = "));
    qb.push_bind(interaction_at);

    if let Some(nome) = &changes.nome {
        qb.push(", nome = ").push_bind(nome.trim().to_string());
    }
    if let Some(status) = changes.status {
        qb.push(", status = ").push_bind(status.as_str());
    }
    push_optional_text(&mut qb, "vendedor", &changes.vendedor);
    push_optional_text(&mut qb, "carro_interesse", &changes.carro_interesse);
    push_optional_text(&mut qb, "faixa_preco", &changes.faixa_preco);
    push_optional_text(&mut qb, "observacoes", &changes.observacoes);

    qb.push(" WHERE id = ").push_bind(key);
    qb.push(format!(" RETURNING {LEAD_COLUMNS}"));
    qb
}

// String vazia vira NULL (ex.: tirar o vendedor do lead).
fn push_optional_text(qb: &mut QueryBuilder<'static, Postgres>, column: &str, value: &Option<String>) {
    if let Some(value) = value {
        let trimmed = value.trim();
        let bound = (!trimmed.is_empty()).then(|| trimmed.to_string());
        qb.push(format!(", {column} = ")).push_bind(bound);
    }
}
