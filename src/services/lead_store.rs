// src/services/lead_store.rs

use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::sync::RwLock;

use crate::{
    db::LeadGateway,
    models::lead::{Lead, LeadId},
};

/// Evento já decodificado do feed de mudanças.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeEvent {
    Insert(Lead),
    /// Campos alterados da linha; os ausentes ficam como estão.
    Update {
        id: LeadId,
        fields: Map<String, Value>,
    },
    Delete(LeadId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOutcome {
    Inserted,
    Replaced,
    Updated,
    Removed,
    Ignored,
}

/// Insere no topo ou, se o id já existe, substitui no lugar.
pub fn upsert(leads: &mut Vec<Lead>, lead: Lead) -> ChangeOutcome {
    match leads.iter_mut().find(|l| l.id == lead.id) {
        Some(existing) => {
            *existing = lead;
            ChangeOutcome::Replaced
        }
        None => {
            leads.insert(0, lead);
            ChangeOutcome::Inserted
        }
    }
}

/// Reconciliação de um evento contra a coleção em memória.
pub fn apply_change(leads: &mut Vec<Lead>, event: ChangeEvent) -> ChangeOutcome {
    match event {
        // Insert é upsert: um replay depois de reconexão não duplica o lead.
        ChangeEvent::Insert(lead) => upsert(leads, lead),

        ChangeEvent::Update { id, fields } => {
            let Some(existing) = leads.iter_mut().find(|l| l.id == id) else {
                // Linha completa de um lead que o store ainda não viu (ex.: carga
                // antiga); vira insert. Parcial não tem como ser aplicada.
                return match serde_json::from_value::<Lead>(Value::Object(fields)) {
                    Ok(lead) if lead.id == id => upsert(leads, lead),
                    _ => {
                        tracing::debug!(lead_id = %id, "Update para lead fora da coleção; ignorado");
                        ChangeOutcome::Ignored
                    }
                };
            };

            match existing.merged_with(&fields) {
                Ok(merged) => {
                    *existing = merged;
                    ChangeOutcome::Updated
                }
                Err(e) => {
                    tracing::warn!(lead_id = %id, "Update com campos inválidos ignorado: {}", e);
                    ChangeOutcome::Ignored
                }
            }
        }

        ChangeEvent::Delete(id) => {
            let before = leads.len();
            leads.retain(|l| l.id != id);
            if leads.len() < before {
                ChangeOutcome::Removed
            } else {
                ChangeOutcome::Ignored
            }
        }
    }
}

/// Espelho em memória da tabela de leads.
///
/// Ordem: a da carga inicial (mais recentes primeiro), com inserts do feed
/// entrando no topo. Não há reordenação por data.
#[derive(Clone, Default)]
pub struct LeadStore {
    leads: Arc<RwLock<Vec<Lead>>>,
}

impl LeadStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Carga completa. Falha na busca é logada e resulta em coleção vazia:
    /// "sem dados" e "falhou" são tratados igual.
    pub async fn load(&self, gateway: &dyn LeadGateway) -> usize {
        let leads = match gateway.fetch_all().await {
            Ok(leads) => leads,
            Err(e) => {
                tracing::error!("🔥 Erro ao buscar leads: {}", e);
                Vec::new()
            }
        };

        let total = leads.len();
        *self.leads.write().await = leads;
        tracing::info!("✅ {} leads carregados", total);
        total
    }

    pub async fn apply(&self, event: ChangeEvent) -> ChangeOutcome {
        let mut leads = self.leads.write().await;
        apply_change(&mut leads, event)
    }

    pub async fn upsert(&self, lead: Lead) -> ChangeOutcome {
        let mut leads = self.leads.write().await;
        upsert(&mut leads, lead)
    }

    pub async fn snapshot(&self) -> Vec<Lead> {
        self.leads.read().await.clone()
    }

    pub async fn find(&self, id: &LeadId) -> Option<Lead> {
        self.leads.read().await.iter().find(|l| &l.id == id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.leads.read().await.len()
    }
}
