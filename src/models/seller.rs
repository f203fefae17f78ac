// src/models/seller.rs

use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

/// Vendedor cadastrado na tabela `vendedores`.
/// Os números (recebidos, vendas, conversão) não ficam aqui: são derivados dos leads.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Vendedor {
    #[schema(example = "1")]
    pub id: String,
    #[schema(example = "Wilson")]
    pub nome: String,
    #[schema(example = "https://picsum.photos/seed/wilson/100")]
    pub avatar_url: Option<String>,
}

/// Opções do filtro de vendedor: "Todos" seguido dos nomes únicos em ordem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct SellerOptions {
    #[schema(example = json!(["Todos", "Ana", "Beto"]))]
    pub options: Vec<String>,
}
