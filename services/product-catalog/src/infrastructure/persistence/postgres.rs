//! PostgreSQL 数据源实现

use std::future::Future;
use std::time::Duration;

use astro_bootstrap::{Timer, record_db_query};
use astro_errors::{AppError, AppResult};
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::error;

use super::rows::ProductRow;
use crate::domain::{CatalogSource, DataSourceMode, Product, product_not_found};

const LIST_SQL: &str = r#"
    SELECT id, name, description, picture, price_currency_code, price_units, price_nanos, categories
    FROM products
    ORDER BY name
"#;

const GET_SQL: &str = r#"
    SELECT id, name, description, picture, price_currency_code, price_units, price_nanos, categories
    FROM products
    WHERE id = $1
"#;

const SEARCH_SQL: &str = r#"
    SELECT id, name, description, picture, price_currency_code, price_units, price_nanos, categories
    FROM products
    WHERE name ILIKE $1 OR description ILIKE $1
    ORDER BY name
"#;

/// ILIKE 子串匹配模式，转义通配符
pub fn like_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// products 表上的数据源
///
/// 不做本地重试；请求 future 被丢弃时查询随之取消
pub struct PostgresCatalogSource {
    pool: PgPool,
    query_timeout: Duration,
}

impl PostgresCatalogSource {
    pub fn new(pool: PgPool, query_timeout: Duration) -> Self {
        Self { pool, query_timeout }
    }

    async fn timed<T, F>(&self, operation: &str, query: F) -> AppResult<T>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        let timer = Timer::start();
        let result = match tokio::time::timeout(self.query_timeout, query).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(AppError::database(format!("failed to {} products: {}", operation, e))),
            Err(_) => Err(AppError::database(format!(
                "{} products timed out after {:?}",
                operation, self.query_timeout
            ))),
        };

        record_db_query(operation, "products", timer.elapsed_ms(), result.is_ok());
        if let Err(e) = &result {
            error!(operation, error = %e, "Database query failed");
        }
        result
    }
}

#[async_trait]
impl CatalogSource for PostgresCatalogSource {
    fn mode(&self) -> DataSourceMode {
        DataSourceMode::Database
    }

    async fn list_products(&self) -> AppResult<Vec<Product>> {
        let rows = self
            .timed(
                "list",
                sqlx::query_as::<_, ProductRow>(LIST_SQL).fetch_all(&self.pool),
            )
            .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn get_product(&self, id: &str) -> AppResult<Product> {
        let row = self
            .timed(
                "get",
                sqlx::query_as::<_, ProductRow>(GET_SQL)
                    .bind(id)
                    .fetch_optional(&self.pool),
            )
            .await?;

        row.map(Product::from).ok_or_else(|| product_not_found(id))
    }

    async fn search_products(&self, query: &str) -> AppResult<Vec<Product>> {
        let rows = self
            .timed(
                "search",
                sqlx::query_as::<_, ProductRow>(SEARCH_SQL)
                    .bind(like_pattern(query))
                    .fetch_all(&self.pool),
            )
            .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }
}
