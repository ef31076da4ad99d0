//! 基础设施资源管理
//!
//! 统一管理服务共享的基础设施资源

use std::sync::Arc;
use std::time::Duration;

use astro_adapter_postgres::{PostgresConfig, create_pool};
use astro_config::{AppConfig, DatabaseConfig};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::retry::{RetryConfig, with_retry};

/// 基础设施资源容器
#[derive(Clone)]
pub struct Infrastructure {
    /// 应用配置
    config: AppConfig,
    /// PostgreSQL 连接池（未启用或连接失败时为 None）
    postgres_pool: Option<PgPool>,
    /// 进程级关闭 token
    shutdown: CancellationToken,
    /// 需要在关闭时等待的后台任务
    background: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl Infrastructure {
    /// 从配置创建基础设施资源（带重试）
    ///
    /// 数据库是可选依赖：未启用、未配置或连接失败时都继续启动
    pub async fn from_config(config: AppConfig, shutdown: CancellationToken) -> Self {
        let postgres_pool = if !config.catalog.use_database {
            info!("Database mode disabled, using JSON file catalog");
            None
        } else {
            match config.database.as_ref().filter(|db| !db.url.expose_secret().is_empty()) {
                None => {
                    warn!("Database connection string not set, falling back to JSON file catalog");
                    None
                }
                Some(db) => connect_postgres(db).await,
            }
        };

        Self {
            config,
            postgres_pool,
            shutdown,
            background: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn postgres_pool(&self) -> Option<PgPool> {
        self.postgres_pool.clone()
    }

    /// 关闭时会被取消的子 token
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.child_token()
    }

    /// 登记后台任务，关闭时等待其结束
    pub async fn track(&self, handle: JoinHandle<()>) {
        self.background.lock().await.push(handle);
    }

    /// 取消并等待所有后台任务
    pub async fn shutdown(&self, grace: Duration) {
        self.shutdown.cancel();

        let handles: Vec<_> = self.background.lock().await.drain(..).collect();
        for handle in handles {
            match tokio::time::timeout(grace, handle).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => error!(error = %e, "Background task panicked"),
                Err(_) => warn!("Background task did not stop in time"),
            }
        }

        if let Some(pool) = &self.postgres_pool {
            pool.close().await;
            info!("Database connection closed");
        }
    }
}

async fn connect_postgres(db: &DatabaseConfig) -> Option<PgPool> {
    let pg_config = PostgresConfig::new(db.url.expose_secret().clone())
        .with_pool(db.min_connections, db.max_connections)
        .with_connect_timeout(Duration::from_secs(db.connect_timeout_secs))
        .with_max_lifetime(Duration::from_secs(db.max_lifetime_secs));

    info!("Initializing database connection for product catalog");
    let result = with_retry(&RetryConfig::default(), "PostgreSQL connection", || {
        let cfg = pg_config.clone();
        async move { create_pool(&cfg).await }
    })
    .await;

    match result {
        Ok(pool) => {
            info!(
                max_connections = db.max_connections,
                "Database connection established successfully"
            );
            Some(pool)
        }
        Err(e) => {
            error!(
                error = %e,
                "Failed to initialize database, falling back to JSON file catalog"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use astro_config::{CatalogConfig, FeatureFlagsConfig, ServerConfig, TelemetryConfig};
    use secrecy::Secret;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn config(use_database: bool, url: Option<&str>) -> AppConfig {
        AppConfig {
            app_name: "product-catalog".to_string(),
            app_env: "test".to_string(),
            server: ServerConfig::default(),
            telemetry: TelemetryConfig::default(),
            catalog: CatalogConfig {
                use_database,
                ..CatalogConfig::default()
            },
            database: url.map(|u| DatabaseConfig {
                url: Secret::new(u.to_string()),
                max_connections: 2,
                min_connections: 0,
                max_lifetime_secs: 60,
                connect_timeout_secs: 1,
                query_timeout_secs: 1,
            }),
            feature_flags: FeatureFlagsConfig::default(),
        }
    }

    #[tokio::test]
    async fn test_database_disabled() {
        let infra = Infrastructure::from_config(
            config(false, Some("postgres://localhost/catalog")),
            CancellationToken::new(),
        )
        .await;
        assert!(infra.postgres_pool().is_none());
    }

    #[tokio::test]
    async fn test_database_enabled_without_url() {
        let infra = Infrastructure::from_config(config(true, Some("")), CancellationToken::new()).await;
        assert!(infra.postgres_pool().is_none());

        let infra = Infrastructure::from_config(config(true, None), CancellationToken::new()).await;
        assert!(infra.postgres_pool().is_none());
    }

    #[tokio::test]
    async fn test_shutdown_cancels_tracked_tasks() {
        let infra = Infrastructure::from_config(config(false, None), CancellationToken::new()).await;
        let stopped = Arc::new(AtomicBool::new(false));

        let token = infra.shutdown_token();
        let flag = stopped.clone();
        infra
            .track(tokio::spawn(async move {
                token.cancelled().await;
                flag.store(true, Ordering::SeqCst);
            }))
            .await;

        infra.shutdown(Duration::from_secs(1)).await;
        assert!(stopped.load(Ordering::SeqCst));
    }
}
