// src/services/dashboard_service.rs

use std::collections::{BTreeMap, HashMap};

use chrono::{FixedOffset, NaiveDate, Utc};

use crate::{
    models::{
        dashboard::{ChartEntry, DashboardOverview, DashboardStats, SellerPerformance},
        lead::{Lead, LeadStatus},
    },
    services::lead_store::LeadStore,
};

// =========================================================================
//  REGRAS CANÔNICAS
//  Cada métrica tem uma única definição, e é esta.
// =========================================================================

/// Funil ativo: o lead está sendo trabalhado.
pub const ACTIVE_PIPELINE: [LeadStatus; 3] = [
    LeadStatus::Respondeu,
    LeadStatus::EmNegociacao,
    LeadStatus::PedidoDeCompra,
];

pub fn is_active(status: LeadStatus) -> bool {
    ACTIVE_PIPELINE.contains(&status)
}

/// Lead sem atendimento ("atrasado"): ainda não foi classificado, ou seja,
/// continua `Novo` (status vazio ou desconhecido também lê como `Novo`).
pub fn is_unattended(lead: &Lead) -> bool {
    lead.status == LeadStatus::Novo
}

/// `round(100 * ganhos / total)`, 0 quando não há leads.
pub fn conversion_rate(won: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((won as f64 / total as f64) * 100.0).round() as u32
}

fn is_created_on(lead: &Lead, day: NaiveDate, offset: &FixedOffset) -> bool {
    lead.created_at.with_timezone(offset).date_naive() == day
}

/// Redutor puro: coleção de leads -> números e gráficos do painel.
pub fn compute_overview(leads: &[Lead], today: NaiveDate, offset: &FixedOffset) -> DashboardOverview {
    let total = leads.len();
    let vendidos = leads.iter().filter(|l| l.status == LeadStatus::Vendido).count();

    let mut alerts_by_seller: BTreeMap<String, usize> = BTreeMap::new();
    for lead in leads.iter().filter(|l| is_unattended(l)) {
        *alerts_by_seller.entry(lead.seller_bucket().to_string()).or_default() += 1;
    }
    let leads_atrasados = alerts_by_seller.values().sum();

    let stats = DashboardStats {
        total_hoje: leads.iter().filter(|l| is_created_on(l, today, offset)).count(),
        em_atendimento: leads.iter().filter(|l| is_active(l.status)).count(),
        vendidos,
        taxa_conversao: conversion_rate(vendidos, total),
        leads_atrasados,
    };

    DashboardOverview {
        reference_date: today,
        stats,
        alerts_by_seller,
        origens: origin_breakdown(leads),
        vendedores: seller_breakdown(leads),
    }
}

/// Contagem por origem, na ordem em que cada origem aparece.
pub fn origin_breakdown(leads: &[Lead]) -> Vec<ChartEntry> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut entries: Vec<ChartEntry> = Vec::new();

    for lead in leads {
        let origem = lead.origem_or_default();
        let pos = *index.entry(origem).or_insert_with(|| {
            entries.push(ChartEntry {
                name: origem.to_string(),
                value: 0,
            });
            entries.len() - 1
        });
        entries[pos].value += 1;
    }

    entries
}

/// Contatos recebidos x vendas por vendedor ("Sem Vendedor" incluso), na ordem
/// em que cada vendedor aparece.
pub fn seller_breakdown(leads: &[Lead]) -> Vec<SellerPerformance> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut sellers: Vec<SellerPerformance> = Vec::new();

    for lead in leads {
        let name = lead.seller_bucket();
        let pos = *index.entry(name).or_insert_with(|| {
            sellers.push(SellerPerformance {
                name: name.to_string(),
                recebidos: 0,
                ganhos: 0,
                conversao: 0,
            });
            sellers.len() - 1
        });

        let seller = &mut sellers[pos];
        seller.recebidos += 1;
        if lead.status == LeadStatus::Vendido {
            seller.ganhos += 1;
        }
    }

    for seller in &mut sellers {
        seller.conversao = conversion_rate(seller.ganhos, seller.recebidos);
    }

    sellers
}

#[derive(Clone)]
pub struct DashboardService {
    store: LeadStore,
    utc_offset: FixedOffset,
}

impl DashboardService {
    pub fn new(store: LeadStore, utc_offset: FixedOffset) -> Self {
        Self { store, utc_offset }
    }

    /// Recalcula tudo sobre o snapshot atual do store.
    pub async fn get_overview(&self) -> DashboardOverview {
        let leads = self.store.snapshot().await;
        let today = Utc::now().with_timezone(&self.utc_offset).date_naive();
        compute_overview(&leads, today, &self.utc_offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::lead;
    use chrono::{Duration, TimeZone};

    fn brt() -> FixedOffset {
        FixedOffset::west_opt(3 * 3600).unwrap()
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn conversion_rate_rounds_and_handles_empty() {
        assert_eq!(conversion_rate(0, 0), 0);
        assert_eq!(conversion_rate(1, 3), 33);
        assert_eq!(conversion_rate(2, 3), 67);
        assert_eq!(conversion_rate(1, 8), 13);
        assert_eq!(conversion_rate(4, 4), 100);
    }

    #[test]
    fn sold_new_lost_scenario() {
        let leads = vec![
            lead("1", "A", LeadStatus::Vendido, None),
            lead("2", "B", LeadStatus::Novo, None),
            lead("3", "C", LeadStatus::Perdido, None),
        ];

        let overview = compute_overview(&leads, day(2026, 10, 19), &brt());

        assert_eq!(overview.stats.taxa_conversao, 33);
        assert_eq!(overview.stats.em_atendimento, 0);
        assert_eq!(overview.stats.vendidos, 1);
        assert_eq!(overview.stats.leads_atrasados, 1);
    }

    #[test]
    fn empty_collection_gives_zeroed_stats() {
        let overview = compute_overview(&[], day(2026, 10, 19), &brt());
        assert_eq!(overview.stats, DashboardStats::default());
        assert!(overview.alerts_by_seller.is_empty());
        assert!(overview.origens.is_empty());
        assert!(overview.vendedores.is_empty());
    }

    #[test]
    fn active_pipeline_counts_only_the_three_working_stages() {
        let leads: Vec<_> = LeadStatus::ALL
            .iter()
            .enumerate()
            .map(|(i, s)| lead(&i.to_string(), "X", *s, None))
            .collect();

        let overview = compute_overview(&leads, day(2026, 10, 19), &brt());
        assert_eq!(overview.stats.em_atendimento, 3);
    }

    #[test]
    fn today_uses_the_dashboard_offset() {
        let mut late_night = lead("1", "A", LeadStatus::Novo, None);
        // 02:30 UTC do dia 20 ainda é dia 19 em Brasília.
        late_night.created_at = Utc.with_ymd_and_hms(2026, 10, 20, 2, 30, 0).unwrap();

        let mut yesterday = lead("2", "B", LeadStatus::Novo, None);
        yesterday.created_at = late_night.created_at - Duration::days(1);

        let overview = compute_overview(&[late_night, yesterday], day(2026, 10, 19), &brt());
        assert_eq!(overview.stats.total_hoje, 1);
    }

    #[test]
    fn alerts_group_unattended_leads_by_seller() {
        let leads = vec![
            lead("1", "A", LeadStatus::Novo, Some("Ana")),
            lead("2", "B", LeadStatus::Novo, None),
            lead("3", "C", LeadStatus::Novo, Some("Ana")),
            lead("4", "D", LeadStatus::Respondeu, Some("Beto")),
            lead("5", "E", LeadStatus::Novo, Some("")),
        ];

        let overview = compute_overview(&leads, day(2026, 10, 19), &brt());

        assert_eq!(overview.stats.leads_atrasados, 4);
        assert_eq!(overview.alerts_by_seller.get("Ana"), Some(&2));
        assert_eq!(overview.alerts_by_seller.get("Sem Vendedor"), Some(&2));
        assert_eq!(overview.alerts_by_seller.get("Beto"), None);
    }

    #[test]
    fn origins_default_to_facebook_in_first_seen_order() {
        let mut instagram = lead("1", "A", LeadStatus::Novo, None);
        instagram.origem = Some("Instagram".into());
        let facebook = lead("2", "B", LeadStatus::Novo, None);
        let mut site = lead("3", "C", LeadStatus::Novo, None);
        site.origem = Some("Site".into());
        let mut instagram2 = lead("4", "D", LeadStatus::Novo, None);
        instagram2.origem = Some("Instagram".into());

        let origens = origin_breakdown(&[instagram, facebook, site, instagram2]);
        assert_eq!(
            origens,
            vec![
                ChartEntry { name: "Instagram".into(), value: 2 },
                ChartEntry { name: "Facebook Ads".into(), value: 1 },
                ChartEntry { name: "Site".into(), value: 1 },
            ]
        );
    }

    #[test]
    fn seller_breakdown_counts_received_and_won() {
        let leads = vec![
            lead("1", "A", LeadStatus::Vendido, Some("Ana")),
            lead("2", "B", LeadStatus::Novo, Some("Ana")),
            lead("3", "C", LeadStatus::Vendido, None),
            lead("4", "D", LeadStatus::Perdido, Some("Beto")),
        ];

        let sellers = seller_breakdown(&leads);
        assert_eq!(
            sellers,
            vec![
                SellerPerformance { name: "Ana".into(), recebidos: 2, ganhos: 1, conversao: 50 },
                SellerPerformance { name: "Sem Vendedor".into(), recebidos: 1, ganhos: 1, conversao: 100 },
                SellerPerformance { name: "Beto".into(), recebidos: 1, ganhos: 0, conversao: 0 },
            ]
        );
    }

    #[tokio::test]
    async fn service_reads_the_store_snapshot() {
        let store = LeadStore::new();
        store.upsert(lead("1", "A", LeadStatus::Vendido, Some("Ana"))).await;
        store.upsert(lead("2", "B", LeadStatus::Respondeu, Some("Ana"))).await;

        let overview = DashboardService::new(store, brt()).get_overview().await;
        assert_eq!(overview.stats.taxa_conversao, 50);
        assert_eq!(overview.stats.em_atendimento, 1);
    }
}
