// src/services/lead_service.rs

use std::sync::Arc;

use chrono::Utc;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::{
    common::error::AppError,
    db::LeadGateway,
    models::lead::{KanbanColumn, Lead, LeadChanges, LeadId, LeadStatus},
    services::{
        lead_filter::{self, LeadFilter},
        lead_store::LeadStore,
    },
};

/// Leituras saem do store em memória; escritas vão ao banco e o resultado
/// confirmado volta para o store.
#[derive(Clone)]
pub struct LeadService {
    gateway: Arc<dyn LeadGateway>,
    store: LeadStore,
}

impl LeadService {
    pub fn new(gateway: Arc<dyn LeadGateway>, store: LeadStore) -> Self {
        Self { gateway, store }
    }

    pub async fn list(&self, filter: &LeadFilter) -> Vec<Lead> {
        filter.apply(self.store.snapshot().await)
    }

    pub async fn get(&self, id: &LeadId) -> Result<Lead, AppError> {
        self.store
            .find(id)
            .await
            .ok_or_else(|| AppError::LeadNotFound(id.clone()))
    }

    pub async fn kanban(&self, filter: &LeadFilter) -> Vec<KanbanColumn> {
        lead_filter::kanban(self.list(filter).await)
    }

    pub async fn seller_options(&self) -> Vec<String> {
        lead_filter::seller_options(&self.store.snapshot().await)
    }

    /// Único caminho de escrita: grava as alterações com `last_interaction_at`
    /// e aplica a linha devolvida no store, sem esperar o feed.
    pub async fn update_lead(&self, id: &LeadId, changes: LeadChanges) -> Result<Lead, AppError> {
        changes.validate()?;
        if changes.nome.as_deref().is_some_and(|n| n.trim().is_empty()) {
            let mut errors = ValidationErrors::new();
            errors.add("nome", ValidationError::new("length").with_message("required".into()));
            return Err(AppError::ValidationError(errors));
        }

        let updated = self.gateway.update(id, &changes, Utc::now()).await?;
        self.store.upsert(updated.clone()).await;

        tracing::info!(lead_id = %id, status = %updated.status, "Lead atualizado");
        Ok(updated)
    }

    /// Mudança rápida de status (kanban / select da tabela).
    pub async fn update_status(&self, id: &LeadId, status: LeadStatus) -> Result<Lead, AppError> {
        self.update_lead(id, LeadChanges::status_only(status)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{lead, FakeGateway};

    async fn service_with(leads: Vec<Lead>) -> (LeadService, Arc<FakeGateway>) {
        let gateway = Arc::new(FakeGateway::with_leads(leads));
        let store = LeadStore::new();
        store.load(gateway.as_ref()).await;
        (LeadService::new(gateway.clone(), store), gateway)
    }

    #[tokio::test]
    async fn status_change_stamps_interaction_and_keeps_other_fields() {
        let mut original = lead("1", "Ana", LeadStatus::Novo, Some("Wilson"));
        original.carro_interesse = Some("Onix".into());
        let (service, gateway) = service_with(vec![original.clone()]).await;

        let before = Utc::now();
        let updated = service
            .update_status(&LeadId::from("1"), LeadStatus::Respondeu)
            .await
            .unwrap();

        assert_eq!(updated.status, LeadStatus::Respondeu);
        assert!(updated.last_interaction_at.unwrap() >= before);
        assert_eq!(updated.carro_interesse, original.carro_interesse);
        assert_eq!(updated.vendedor, original.vendedor);

        let stored = service.get(&LeadId::from("1")).await.unwrap();
        assert_eq!(stored, updated);
        assert_eq!(gateway.updates().len(), 1);
    }

    #[tokio::test]
    async fn full_save_clears_empty_optional_fields() {
        let (service, _) = service_with(vec![lead("1", "Ana", LeadStatus::Novo, Some("Wilson"))]).await;

        let changes = LeadChanges {
            nome: Some("Ana Paula".into()),
            vendedor: Some(String::new()),
            faixa_preco: Some("R$ 80.000".into()),
            ..Default::default()
        };
        let updated = service.update_lead(&LeadId::from("1"), changes).await.unwrap();

        assert_eq!(updated.nome, "Ana Paula");
        assert_eq!(updated.vendedor, None);
        assert_eq!(updated.faixa_preco.as_deref(), Some("R$ 80.000"));
    }

    #[tokio::test]
    async fn blank_name_is_rejected_before_writing() {
        let (service, gateway) = service_with(vec![lead("1", "Ana", LeadStatus::Novo, None)]).await;

        let changes = LeadChanges {
            nome: Some("   ".into()),
            ..Default::default()
        };
        let err = service.update_lead(&LeadId::from("1"), changes).await.unwrap_err();

        assert!(matches!(err, AppError::ValidationError(_)));
        assert!(gateway.updates().is_empty());
    }

    #[tokio::test]
    async fn failed_write_leaves_the_store_untouched() {
        let (service, _) = service_with(vec![lead("1", "Ana", LeadStatus::Novo, None)]).await;
        let failing = LeadService::new(Arc::new(FakeGateway::failing()), service.store.clone());

        let result = failing
            .update_status(&LeadId::from("1"), LeadStatus::Vendido)
            .await;

        assert!(result.is_err());
        let stored = service.get(&LeadId::from("1")).await.unwrap();
        assert_eq!(stored.status, LeadStatus::Novo);
        assert_eq!(stored.last_interaction_at, None);
    }

    #[tokio::test]
    async fn unknown_lead_is_not_found() {
        let (service, _) = service_with(Vec::new()).await;

        let err = service
            .update_status(&LeadId::from("99"), LeadStatus::Vendido)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::LeadNotFound(_)));

        let err = service.get(&LeadId::from("99")).await.unwrap_err();
        assert!(matches!(err, AppError::LeadNotFound(_)));
    }

    #[tokio::test]
    async fn listing_filters_the_store_snapshot() {
        let (service, _) = service_with(vec![
            lead("1", "Ana", LeadStatus::Novo, Some("Wilson")),
            lead("2", "Beto", LeadStatus::Vendido, Some("Carla")),
        ])
        .await;

        let filter = LeadFilter {
            vendedor: Some("Carla".into()),
            ..Default::default()
        };
        let leads = service.list(&filter).await;
        assert_eq!(leads.len(), 1);
        assert_eq!(leads[0].nome, "Beto");

        assert_eq!(service.seller_options().await, vec!["Todos", "Carla", "Wilson"]);
    }
}
