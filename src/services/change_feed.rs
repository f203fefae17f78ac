// src/services/change_feed.rs

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use sqlx::{postgres::PgListener, PgPool};
use tokio::task::JoinHandle;

use crate::{
    common::error::AppError,
    db::LeadGateway,
    models::lead::{Lead, LeadId},
    services::lead_store::{ChangeEvent, ChangeOutcome, LeadStore},
};

/// Canal do NOTIFY disparado pela trigger de `leads_facebook_2026`.
pub const LEADS_CHANNEL: &str = "leads_facebook_2026_changes";

const RETRY_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// Payload JSON enviado pela trigger.
#[derive(Debug, Deserialize)]
pub struct ChangeNotification {
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    #[serde(default)]
    pub new: Option<Value>,
    #[serde(default)]
    pub old: Option<Value>,
    /// Linha grande demais para o NOTIFY: só o id veio.
    #[serde(default)]
    pub truncated: bool,
}

#[derive(Debug, PartialEq)]
pub enum DecodedChange {
    Ready(ChangeEvent),
    /// Precisa buscar a linha completa antes de aplicar.
    NeedsFetch(LeadId),
}

fn invalid(msg: impl Into<String>) -> AppError {
    AppError::InvalidChangePayload(msg.into())
}

fn row_id(row: &Value) -> Result<LeadId, AppError> {
    let id = row.get("id").ok_or_else(|| invalid("linha sem id"))?;
    LeadId::deserialize(id).map_err(|e| invalid(e.to_string()))
}

pub fn decode(payload: &str) -> Result<DecodedChange, AppError> {
    let notification: ChangeNotification =
        serde_json::from_str(payload).map_err(|e| invalid(e.to_string()))?;

    match notification.kind {
        ChangeKind::Insert | ChangeKind::Update => {
            let row = notification
                .new
                .ok_or_else(|| invalid("evento sem a linha nova"))?;

            if notification.truncated {
                return Ok(DecodedChange::NeedsFetch(row_id(&row)?));
            }

            if notification.kind == ChangeKind::Insert {
                let lead: Lead =
                    serde_json::from_value(row).map_err(|e| invalid(e.to_string()))?;
                Ok(DecodedChange::Ready(ChangeEvent::Insert(lead)))
            } else {
                let id = row_id(&row)?;
                let Value::Object(fields) = row else {
                    return Err(invalid("linha nova não é um objeto"));
                };
                Ok(DecodedChange::Ready(ChangeEvent::Update { id, fields }))
            }
        }
        ChangeKind::Delete => {
            let row = notification
                .old
                .ok_or_else(|| invalid("delete sem a linha antiga"))?;
            Ok(DecodedChange::Ready(ChangeEvent::Delete(row_id(&row)?)))
        }
    }
}

/// Decodifica e aplica uma notificação no store.
pub async fn process_notification(
    payload: &str,
    store: &LeadStore,
    gateway: &dyn LeadGateway,
) -> Result<ChangeOutcome, AppError> {
    let event = match decode(payload)? {
        DecodedChange::Ready(event) => event,
        DecodedChange::NeedsFetch(id) => match gateway.fetch_one(&id).await? {
            Some(lead) => ChangeEvent::Insert(lead),
            // Apagado entre o NOTIFY e a busca; o DELETE ainda vai chegar.
            None => return Ok(ChangeOutcome::Ignored),
        },
    };

    Ok(store.apply(event).await)
}

/// De onde vêm os payloads do NOTIFY. `Ok(None)` significa conexão perdida:
/// a fonte reconecta sozinha, mas o que foi notificado no meio se perdeu.
#[async_trait]
pub trait NotificationSource: Send {
    async fn next_payload(&mut self) -> Result<Option<String>, sqlx::Error>;
}

#[async_trait]
impl NotificationSource for PgListener {
    async fn next_payload(&mut self) -> Result<Option<String>, sqlx::Error> {
        Ok(self
            .try_recv()
            .await?
            .map(|notification| notification.payload().to_string()))
    }
}

/// O que o loop fez com um resultado da fonte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedStep {
    Applied(ChangeOutcome),
    Skipped,
    /// Recarga completa depois de reconexão (quantidade de leads).
    Reloaded(usize),
    /// Erro na fonte; o loop espera antes de tentar de novo.
    Retry,
}

pub async fn handle_received(
    received: Result<Option<String>, sqlx::Error>,
    store: &LeadStore,
    gateway: &dyn LeadGateway,
) -> FeedStep {
    match received {
        Ok(Some(payload)) => match process_notification(&payload, store, gateway).await {
            Ok(outcome) => {
                tracing::debug!(?outcome, "Evento do feed aplicado");
                FeedStep::Applied(outcome)
            }
            Err(e) => {
                tracing::warn!("Evento do feed ignorado: {}", e);
                FeedStep::Skipped
            }
        },
        Ok(None) => {
            tracing::warn!("⚠️ Conexão do feed perdida; recarregando os leads");
            FeedStep::Reloaded(store.load(gateway).await)
        }
        Err(e) => {
            tracing::error!("🔥 Erro no feed de mudanças: {}", e);
            FeedStep::Retry
        }
    }
}

/// Assinatura do feed de mudanças. Criada por `connect`, encerrada por
/// `dispose` (ou ao sair de escopo).
pub struct ChangeFeed {
    handle: JoinHandle<()>,
}

impl ChangeFeed {
    /// Faz o LISTEN e dispara a tarefa que carrega o store e aplica os eventos.
    pub async fn connect(
        pool: &PgPool,
        store: LeadStore,
        gateway: Arc<dyn LeadGateway>,
    ) -> Result<Self, AppError> {
        let mut listener = PgListener::connect_with(pool).await?;
        listener.listen(LEADS_CHANNEL).await?;
        tracing::info!("📡 Escutando mudanças no canal '{}'", LEADS_CHANNEL);

        Ok(Self::spawn(listener, store, gateway))
    }

    pub fn spawn<S>(source: S, store: LeadStore, gateway: Arc<dyn LeadGateway>) -> Self
    where
        S: NotificationSource + 'static,
    {
        let handle = tokio::spawn(run(source, store, gateway));
        Self { handle }
    }

    pub fn dispose(self) {
        tracing::info!("Encerrando o feed de mudanças");
        drop(self);
    }
}

impl Drop for ChangeFeed {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

// A carga inicial roda aqui, antes do primeiro receive: o LISTEN já está ativo,
// então o que mudar durante a carga fica na fila e é aplicado por cima dela.
async fn run<S: NotificationSource>(mut source: S, store: LeadStore, gateway: Arc<dyn LeadGateway>) {
    store.load(gateway.as_ref()).await;

    loop {
        let received = source.next_payload().await;
        if handle_received(received, &store, gateway.as_ref()).await == FeedStep::Retry {
            tokio::time::sleep(RETRY_DELAY).await;
        }
    }
}
