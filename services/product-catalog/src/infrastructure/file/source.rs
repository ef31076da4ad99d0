//! 文件数据源

use std::sync::Arc;

use astro_errors::AppResult;
use async_trait::async_trait;

use super::CatalogStore;
use crate::domain::{CatalogSource, DataSourceMode, Product, product_not_found};

/// 基于 [`CatalogStore`] 当前快照的数据源
///
/// 每次调用只读取调用时刻的快照，不等待刷新
pub struct FileCatalogSource {
    store: Arc<CatalogStore>,
}

impl FileCatalogSource {
    pub fn new(store: Arc<CatalogStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CatalogSource for FileCatalogSource {
    fn mode(&self) -> DataSourceMode {
        DataSourceMode::File
    }

    async fn list_products(&self) -> AppResult<Vec<Product>> {
        Ok(self.store.current().products().to_vec())
    }

    async fn get_product(&self, id: &str) -> AppResult<Product> {
        self.store
            .current()
            .find(id)
            .cloned()
            .ok_or_else(|| product_not_found(id))
    }

    async fn search_products(&self, query: &str) -> AppResult<Vec<Product>> {
        Ok(self.store.current().search(query))
    }
}
