//! 目录服务
//!
//! 请求分派到启动时选定的数据源，外加 GetProduct 上的故障注入开关

use std::sync::Arc;

use astro_bootstrap::Timer;
use astro_errors::{AppError, AppResult};
use astro_ports::{EvaluationContext, FeatureFlagPort};
use metrics::{counter, histogram};
use tracing::{error, info, warn};

use crate::domain::{CatalogSource, DataSourceMode, Product};

/// 故障注入针对的商品 ID
pub const FAILURE_PRODUCT_ID: &str = "OLJCESPC7Z";

/// 故障注入开关名
pub const FAILURE_FLAG: &str = "productCatalogFailure";

/// 故障注入时返回的诊断信息
pub const FAILURE_MESSAGE: &str = "Error: Product Catalog Fail Feature Flag Enabled";

pub struct CatalogService {
    source: Arc<dyn CatalogSource>,
    flags: Arc<dyn FeatureFlagPort>,
}

impl CatalogService {
    pub fn new(source: Arc<dyn CatalogSource>, flags: Arc<dyn FeatureFlagPort>) -> Self {
        Self { source, flags }
    }

    pub fn mode(&self) -> DataSourceMode {
        self.source.mode()
    }

    /// 列出全部商品
    pub async fn list_products(&self) -> AppResult<Vec<Product>> {
        let timer = Timer::start();
        let result = self.source.list_products().await;
        self.record("list_products", &timer, &result);
        result
    }

    /// 按 ID 获取商品
    ///
    /// 故障开关先于查找评估，命中时不访问数据源
    pub async fn get_product(&self, id: &str) -> AppResult<Product> {
        let timer = Timer::start();
        let result = self.lookup(id).await;
        self.record("get_product", &timer, &result);
        result
    }

    /// 名称或描述包含 `query` 的商品
    pub async fn search_products(&self, query: &str) -> AppResult<Vec<Product>> {
        let timer = Timer::start();
        let result = self.source.search_products(query).await;
        if let Ok(found) = &result {
            info!(query, results = found.len(), "Search completed");
        }
        self.record("search_products", &timer, &result);
        result
    }

    async fn lookup(&self, id: &str) -> AppResult<Product> {
        if self.check_product_failure(id).await {
            error!(app.product.id = id, "{}", FAILURE_MESSAGE);
            return Err(AppError::internal(FAILURE_MESSAGE));
        }

        let product = self.source.get_product(id).await?;
        info!(
            app.product.id = %product.id,
            app.product.name = %product.name,
            "Product Found"
        );
        Ok(product)
    }

    /// 评估故障开关，仅对固定 ID 生效；评估失败视为关闭
    pub async fn check_product_failure(&self, id: &str) -> bool {
        if id != FAILURE_PRODUCT_ID {
            return false;
        }

        let ctx = EvaluationContext::new().with_targeting_key(id);
        match self.flags.boolean_value(FAILURE_FLAG, false, &ctx).await {
            Ok(enabled) => enabled,
            Err(e) => {
                warn!(flag = FAILURE_FLAG, error = %e, "Feature flag evaluation failed, treating as disabled");
                false
            }
        }
    }

    fn record<T>(&self, method: &'static str, timer: &Timer, result: &AppResult<T>) {
        let source = self.source.mode().as_str();
        let status = match result {
            Ok(_) => "ok",
            Err(e) if e.is_not_found() => "not_found",
            Err(_) => "error",
        };

        counter!("catalog_requests_total", "method" => method, "source" => source, "status" => status)
            .increment(1);
        histogram!("catalog_request_duration_ms", "method" => method, "source" => source)
            .record(timer.elapsed_ms());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::domain::{CatalogSnapshot, Money, product_not_found};
    use crate::infrastructure::flags::StaticFeatureFlags;
    use async_trait::async_trait;

    struct SnapshotSource {
        snapshot: CatalogSnapshot,
        gets: AtomicUsize,
    }

    impl SnapshotSource {
        fn new(products: Vec<Product>) -> Self {
            Self {
                snapshot: CatalogSnapshot::new(products),
                gets: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl CatalogSource for SnapshotSource {
        fn mode(&self) -> DataSourceMode {
            DataSourceMode::File
        }

        async fn list_products(&self) -> AppResult<Vec<Product>> {
            Ok(self.snapshot.products().to_vec())
        }

        async fn get_product(&self, id: &str) -> AppResult<Product> {
            self.gets.fetch_add(1, Ordering::SeqCst);
            self.snapshot.find(id).cloned().ok_or_else(|| product_not_found(id))
        }

        async fn search_products(&self, query: &str) -> AppResult<Vec<Product>> {
            Ok(self.snapshot.search(query))
        }
    }

    fn product(id: &str, name: &str) -> Product {
        Product {
            id: id.to_string(),
            name: name.to_string(),
            price_usd: Money::new("USD", 1, 0),
            ..Default::default()
        }
    }

    fn service(flag: Option<bool>) -> (CatalogService, Arc<SnapshotSource>) {
        let source = Arc::new(SnapshotSource::new(vec![
            product(FAILURE_PRODUCT_ID, "Explorascope"),
            product("66VCHSJNUP", "Starsense Explorer"),
        ]));
        let flags = StaticFeatureFlags::new(
            flag.map(|v| [(FAILURE_FLAG.to_string(), v)].into_iter().collect())
                .unwrap_or_default(),
        );
        (CatalogService::new(source.clone(), Arc::new(flags)), source)
    }

    #[tokio::test]
    async fn test_failure_flag_preempts_lookup() {
        let (svc, source) = service(Some(true));

        let err = svc.get_product(FAILURE_PRODUCT_ID).await.unwrap_err();
        assert_eq!(err.grpc_code(), tonic::Code::Internal);
        assert_eq!(err.public_message(), FAILURE_MESSAGE);
        assert_eq!(source.gets.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failure_flag_only_applies_to_fixed_id() {
        let (svc, _) = service(Some(true));
        assert_eq!(svc.get_product("66VCHSJNUP").await.unwrap().name, "Starsense Explorer");
        assert!(!svc.check_product_failure("66VCHSJNUP").await);
    }

    #[tokio::test]
    async fn test_disabled_or_absent_flag_returns_product() {
        for flag in [Some(false), None] {
            let (svc, _) = service(flag);
            let found = svc.get_product(FAILURE_PRODUCT_ID).await.unwrap();
            assert_eq!(found.name, "Explorascope");
        }
    }

    #[tokio::test]
    async fn test_missing_product_is_not_found() {
        let (svc, _) = service(None);
        let err = svc.get_product("NOPE").await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.public_message(), "Product Not Found: NOPE");
    }

    #[tokio::test]
    async fn test_list_and_search_delegate_to_source() {
        let (svc, _) = service(None);
        assert_eq!(svc.list_products().await.unwrap().len(), 2);
        assert_eq!(svc.search_products("").await.unwrap().len(), 2);
        assert_eq!(svc.search_products("EXPLORER").await.unwrap()[0].id, "66VCHSJNUP");
        assert_eq!(svc.mode(), DataSourceMode::File);
    }
}
