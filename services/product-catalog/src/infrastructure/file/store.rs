//! 商品目录存储
//!
//! 持有当前生效的快照，按固定间隔从文件重新加载。快照通过 `ArcSwap` 整体替换，
//! 读者只会看到完整的旧快照或完整的新快照。

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use arc_swap::ArcSwap;
use astro_config::DEFAULT_RELOAD_INTERVAL_SECS;
use metrics::{counter, gauge};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::ProductFileLoader;
use crate::domain::CatalogSnapshot;
use crate::error::CatalogError;

pub struct CatalogStore {
    loader: ProductFileLoader,
    current: ArcSwap<CatalogSnapshot>,
    generation: AtomicU64,
}

impl CatalogStore {
    /// 创建存储，初始为空快照
    pub fn new(loader: ProductFileLoader) -> Self {
        Self {
            loader,
            current: ArcSwap::from_pointee(CatalogSnapshot::empty()),
            generation: AtomicU64::new(0),
        }
    }

    /// 当前快照
    pub fn current(&self) -> Arc<CatalogSnapshot> {
        self.current.load_full()
    }

    /// 从文件加载一个新快照，不安装
    pub async fn load(&self) -> Result<CatalogSnapshot, CatalogError> {
        let loader = self.loader.clone();
        let products = tokio::task::spawn_blocking(move || loader.load())
            .await
            .map_err(|e| CatalogError::Task(e.to_string()))??;
        Ok(CatalogSnapshot::new(products))
    }

    /// 加载并安装新快照
    ///
    /// 失败时保留当前快照
    pub async fn reload(&self) -> Result<Arc<CatalogSnapshot>, CatalogError> {
        match self.load().await {
            Ok(snapshot) => {
                let installed = self.install(snapshot);
                counter!("catalog_reloads_total", "result" => "success").increment(1);
                Ok(installed)
            }
            Err(e) => {
                counter!("catalog_reloads_total", "result" => "failure").increment(1);
                Err(e)
            }
        }
    }

    fn install(&self, snapshot: CatalogSnapshot) -> Arc<CatalogSnapshot> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let snapshot = Arc::new(snapshot.with_generation(generation));
        self.current.store(snapshot.clone());
        gauge!("catalog_products").set(snapshot.len() as f64);
        snapshot
    }

    /// 首次加载
    ///
    /// 失败时保持空快照继续服务，返回是否加载成功
    pub async fn initialize(&self) -> bool {
        info!(dir = %self.loader.dir().display(), "Loading Product Catalog...");

        match self.reload().await {
            Ok(snapshot) => {
                info!(products = snapshot.len(), "Loaded {} products", snapshot.len());
                true
            }
            Err(e) => {
                warn!(
                    error = %e,
                    "Error reading product files, serving an empty catalog"
                );
                false
            }
        }
    }

    /// 首次加载后启动定时刷新
    ///
    /// `interval` 为零时使用默认间隔；token 取消后刷新任务退出
    pub async fn start(self: Arc<Self>, interval: Duration, shutdown: CancellationToken) -> JoinHandle<()> {
        self.initialize().await;
        self.spawn_reload_loop(interval, shutdown)
    }

    /// 只启动定时刷新，不做首次加载
    pub fn spawn_reload_loop(self: Arc<Self>, interval: Duration, shutdown: CancellationToken) -> JoinHandle<()> {
        let period = if interval.is_zero() {
            Duration::from_secs(DEFAULT_RELOAD_INTERVAL_SECS)
        } else {
            interval
        };
        info!(interval_secs = period.as_secs(), "Product Catalog reload interval");

        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        info!("Reloading Product Catalog...");
                        match self.reload().await {
                            Ok(snapshot) => info!(products = snapshot.len(), "Product Catalog reloaded"),
                            Err(e) => error!(error = %e, "Error reading product files, keeping previous catalog"),
                        }
                    }
                    _ = shutdown.cancelled() => {
                        info!("Catalog reload task received shutdown signal");
                        break;
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, ids: &[&str]) {
        let products: Vec<_> = ids.iter().map(|id| serde_json::json!({ "id": id })).collect();
        fs::write(dir.join(name), serde_json::json!({ "products": products }).to_string()).unwrap();
    }

    fn ids(snapshot: &CatalogSnapshot) -> Vec<String> {
        snapshot.products().iter().map(|p| p.id.clone()).collect()
    }

    #[tokio::test]
    async fn test_new_store_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = CatalogStore::new(ProductFileLoader::new(dir.path()));
        assert!(store.current().is_empty());
        assert_eq!(store.current().generation(), 0);
    }

    #[tokio::test]
    async fn test_initialize_installs_snapshot() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.json", &["A1", "A2"]);

        let store = CatalogStore::new(ProductFileLoader::new(dir.path()));
        assert!(store.initialize().await);
        assert_eq!(ids(&store.current()), vec!["A1", "A2"]);
        assert_eq!(store.current().generation(), 1);
    }

    #[tokio::test]
    async fn test_initialize_failure_keeps_empty_catalog() {
        let dir = TempDir::new().unwrap();
        let store = CatalogStore::new(ProductFileLoader::new(dir.path().join("missing")));
        assert!(!store.initialize().await);
        assert!(store.current().is_empty());
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_previous_snapshot() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.json", &["A1"]);

        let store = CatalogStore::new(ProductFileLoader::new(dir.path()));
        store.reload().await.unwrap();
        let before = store.current();

        fs::write(dir.path().join("b.json"), "{ not json").unwrap();
        assert!(store.reload().await.unwrap_err().is_parse());

        let after = store.current();
        assert!(Arc::ptr_eq(&before, &after));
        assert_eq!(ids(&after), vec!["A1"]);
    }

    #[tokio::test]
    async fn test_load_does_not_install() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.json", &["A1"]);

        let store = CatalogStore::new(ProductFileLoader::new(dir.path()));
        let snapshot = store.load().await.unwrap();
        assert_eq!(snapshot.len(), 1);
        assert!(store.current().is_empty());
    }
}
