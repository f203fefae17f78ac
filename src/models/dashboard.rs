// src/models/dashboard.rs

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

// 1. Os cards do topo
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct DashboardStats {
    #[schema(example = 4)]
    pub total_hoje: usize,
    #[schema(example = 12)]
    pub em_atendimento: usize,
    #[schema(example = 3)]
    pub vendidos: usize,
    /// Percentual inteiro (0 a 100).
    #[schema(example = 33)]
    pub taxa_conversao: u32,
    #[schema(example = 7)]
    pub leads_atrasados: usize,
}

// 2. Gráfico de pizza (origem dos leads)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ChartEntry {
    #[schema(example = "Facebook Ads")]
    pub name: String,
    #[schema(example = 20)]
    pub value: usize,
}

// 3. Gráfico de barras (contatos x vendas por vendedor)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct SellerPerformance {
    #[schema(example = "Wilson")]
    pub name: String,
    #[schema(example = 10)]
    pub recebidos: usize,
    #[schema(example = 2)]
    pub ganhos: usize,
    #[schema(example = 20)]
    pub conversao: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DashboardOverview {
    #[schema(value_type = String, format = Date, example = "2026-10-19")]
    pub reference_date: NaiveDate,
    pub stats: DashboardStats,
    /// Vendedor (ou "Sem Vendedor") -> leads sem atendimento.
    pub alerts_by_seller: BTreeMap<String, usize>,
    pub origens: Vec<ChartEntry>,
    pub vendedores: Vec<SellerPerformance>,
}
