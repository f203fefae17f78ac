// src/db/seller_repo.rs

use sqlx::PgPool;

use crate::{common::error::AppError, models::seller::Vendedor};

#[derive(Clone)]
pub struct SellerRepository {
    pool: PgPool,
}

impl SellerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Lista os vendedores cadastrados, em ordem alfabética.
    pub async fn list(&self) -> Result<Vec<Vendedor>, AppError> {
        let sellers = sqlx::query_as::<_, Vendedor>(
            "SELECT id::text AS id, nome, avatar_url FROM vendedores ORDER BY nome ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(sellers)
    }
}
