//! 商品数据源接口

use astro_errors::AppResult;
use async_trait::async_trait;

use super::{DataSourceMode, Product};

/// 商品数据源
///
/// 文件与数据库两种实现，启动时选定其一
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// 当前数据源模式
    fn mode(&self) -> DataSourceMode;

    /// 列出全部商品
    async fn list_products(&self) -> AppResult<Vec<Product>>;

    /// 按 ID 获取商品，不存在时返回 NotFound
    async fn get_product(&self, id: &str) -> AppResult<Product>;

    /// 名称或描述包含查询串（大小写不敏感）的商品
    async fn search_products(&self, query: &str) -> AppResult<Vec<Product>>;
}

/// NotFound 的统一消息
pub fn product_not_found(id: &str) -> astro_errors::AppError {
    astro_errors::AppError::not_found(format!("Product Not Found: {}", id))
}
