//! product-catalog Service

use std::sync::Arc;
use std::time::Duration;

use astro_bootstrap::{Infrastructure, run_with_services};
use astro_config::AppConfig;
use astro_errors::AppResult;
use astro_ports::FeatureFlagPort;
use tracing::info;

use product_catalog::api::catalog_router;
use product_catalog::application::CatalogService;
use product_catalog::domain::CatalogSource;
use product_catalog::infrastructure::file::{CatalogStore, FileCatalogSource, ProductFileLoader};
use product_catalog::infrastructure::flags::{FlagdFeatureFlags, StaticFeatureFlags};
use product_catalog::infrastructure::persistence::PostgresCatalogSource;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    run_with_services("config", |infra: Infrastructure, server| async move {
        info!("Initializing product-catalog service...");

        let source = build_source(&infra).await;
        info!(mode = %source.mode(), "Catalog data source selected");

        let flags = build_flags(infra.config())?;
        let service = Arc::new(CatalogService::new(source, flags));

        catalog_router(server, service).await
    })
    .await
}

/// 有数据库连接池时使用数据库，否则加载商品文件并启动定时重载
async fn build_source(infra: &Infrastructure) -> Arc<dyn CatalogSource> {
    let config = infra.config();

    if let Some(pool) = infra.postgres_pool() {
        let query_timeout = config
            .database
            .as_ref()
            .map(|db| Duration::from_secs(db.query_timeout_secs))
            .unwrap_or(Duration::from_secs(5));
        return Arc::new(PostgresCatalogSource::new(pool, query_timeout));
    }

    let store = Arc::new(CatalogStore::new(ProductFileLoader::new(
        config.catalog.products_dir.clone(),
    )));
    let handle = store
        .clone()
        .start(config.catalog.reload_interval(), infra.shutdown_token())
        .await;
    infra.track(handle).await;

    Arc::new(FileCatalogSource::new(store))
}

fn build_flags(config: &AppConfig) -> AppResult<Arc<dyn FeatureFlagPort>> {
    let flags = &config.feature_flags;
    match flags.flagd_base_url() {
        Some(base_url) => {
            info!(%base_url, "Using flagd feature flag provider");
            Ok(Arc::new(FlagdFeatureFlags::new(
                &base_url,
                Duration::from_millis(flags.timeout_ms),
            )?))
        }
        None => {
            info!(flags = flags.static_flags.len(), "Using static feature flags");
            Ok(Arc::new(StaticFeatureFlags::new(flags.static_flags.clone())))
        }
    }
}
