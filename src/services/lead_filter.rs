// src/services/lead_filter.rs

use std::collections::BTreeSet;

use serde::Deserialize;
use utoipa::IntoParams;

use crate::models::lead::{KanbanColumn, Lead, LeadStatus, LeadView};

/// Sentinela "sem filtro" para vendedor e status.
pub const TODOS: &str = "Todos";

/// Filtros da lista de clientes (query string).
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LeadFilter {
    /// Trecho do nome do cliente ou do carro de interesse.
    #[param(example = "corolla")]
    pub search: Option<String>,
    /// Nome exato do vendedor, ou "Todos".
    #[param(example = "Wilson")]
    pub vendedor: Option<String>,
    /// Status exato, ou "Todos".
    #[param(example = "Em Negociação")]
    pub status: Option<String>,
}

fn or_todos(value: &Option<String>) -> &str {
    value.as_deref().filter(|v| !v.is_empty()).unwrap_or(TODOS)
}

impl LeadFilter {
    pub fn matches(&self, lead: &Lead) -> bool {
        self.matches_search(lead) && self.matches_seller(lead) && self.matches_status(lead)
    }

    fn matches_search(&self, lead: &Lead) -> bool {
        let needle = self.search.as_deref().unwrap_or("").to_lowercase();
        if needle.is_empty() {
            return true;
        }
        lead.nome.to_lowercase().contains(&needle)
            || lead
                .carro_interesse
                .as_deref()
                .is_some_and(|carro| carro.to_lowercase().contains(&needle))
    }

    fn matches_seller(&self, lead: &Lead) -> bool {
        let seller = or_todos(&self.vendedor);
        seller == TODOS || lead.vendedor.as_deref() == Some(seller)
    }

    fn matches_status(&self, lead: &Lead) -> bool {
        let status = or_todos(&self.status);
        status == TODOS || lead.status.as_str() == status
    }

    /// Mantém a ordem original.
    pub fn apply(&self, leads: Vec<Lead>) -> Vec<Lead> {
        leads.into_iter().filter(|l| self.matches(l)).collect()
    }
}

/// "Todos" seguido dos vendedores únicos (não vazios), em ordem alfabética.
pub fn seller_options(leads: &[Lead]) -> Vec<String> {
    let unique: BTreeSet<&str> = leads.iter().filter_map(Lead::assigned_seller).collect();

    std::iter::once(TODOS)
        .chain(unique)
        .map(str::to_string)
        .collect()
}

/// Uma coluna por status, na ordem do funil.
pub fn kanban(leads: Vec<Lead>) -> Vec<KanbanColumn> {
    let mut columns: Vec<KanbanColumn> = LeadStatus::ALL
        .iter()
        .map(|status| KanbanColumn {
            status: *status,
            label: status.friendly_label().to_string(),
            total: 0,
            leads: Vec::new(),
        })
        .collect();

    for lead in leads {
        if let Some(column) = columns.iter_mut().find(|c| c.status == lead.status) {
            column.leads.push(LeadView::from(lead));
            column.total += 1;
        }
    }

    columns
}
