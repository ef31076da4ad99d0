//! astro-config - 配置加载库
//!
//! 加载顺序：`default.toml` → `<APP_ENV>.toml` → `APP__` 前缀环境变量 → 旧部署使用的环境变量名

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::Deserialize;
use thiserror::Error;

use secrecy::Secret;

mod lenient;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    Load(#[from] figment::Error),
}

/// 刷新间隔默认值（秒）
pub const DEFAULT_RELOAD_INTERVAL_SECS: u64 = 10;

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3550
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// 遥测配置
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// 商品目录配置
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// 商品 JSON 文件目录
    #[serde(default = "default_products_dir")]
    pub products_dir: PathBuf,
    /// 刷新间隔（秒），非正数或无法解析时回退到默认值
    #[serde(default, deserialize_with = "lenient::int")]
    pub reload_interval_secs: i64,
    /// 是否使用数据库作为数据源
    #[serde(default, deserialize_with = "lenient::flag")]
    pub use_database: bool,
}

fn default_products_dir() -> PathBuf {
    PathBuf::from("./products")
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            products_dir: default_products_dir(),
            reload_interval_secs: 0,
            use_database: false,
        }
    }
}

impl CatalogConfig {
    /// 实际生效的刷新间隔
    pub fn reload_interval(&self) -> Duration {
        if self.reload_interval_secs <= 0 {
            Duration::from_secs(DEFAULT_RELOAD_INTERVAL_SECS)
        } else {
            Duration::from_secs(self.reload_interval_secs as u64)
        }
    }
}

/// 数据库配置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: Secret<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_max_lifetime_secs")]
    pub max_lifetime_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_query_timeout_secs")]
    pub query_timeout_secs: u64,
}

fn default_max_connections() -> u32 {
    25
}

fn default_min_connections() -> u32 {
    5
}

fn default_max_lifetime_secs() -> u64 {
    300
}

fn default_connect_timeout_secs() -> u64 {
    5
}

fn default_query_timeout_secs() -> u64 {
    5
}

/// 特性开关配置
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureFlagsConfig {
    /// flagd 主机，未配置时使用静态开关
    pub flagd_host: Option<String>,
    #[serde(default = "default_flagd_port")]
    pub flagd_port: u16,
    #[serde(default = "default_flag_timeout_ms")]
    pub timeout_ms: u64,
    /// 静态开关值
    #[serde(default, rename = "static")]
    pub static_flags: HashMap<String, bool>,
}

fn default_flagd_port() -> u16 {
    8013
}

fn default_flag_timeout_ms() -> u64 {
    500
}

impl Default for FeatureFlagsConfig {
    fn default() -> Self {
        Self {
            flagd_host: None,
            flagd_port: default_flagd_port(),
            timeout_ms: default_flag_timeout_ms(),
            static_flags: HashMap::new(),
        }
    }
}

impl FeatureFlagsConfig {
    /// flagd HTTP 评估端点的基础地址
    pub fn flagd_base_url(&self) -> Option<String> {
        self.flagd_host
            .as_deref()
            .filter(|h| !h.is_empty())
            .map(|h| format!("http://{}:{}", h, self.flagd_port))
    }
}

/// 应用配置
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_app_name")]
    pub app_name: String,
    #[serde(default = "default_app_env")]
    pub app_env: String,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    pub database: Option<DatabaseConfig>,
    #[serde(default)]
    pub feature_flags: FeatureFlagsConfig,
}

fn default_app_name() -> String {
    "product-catalog".to_string()
}

fn default_app_env() -> String {
    "development".to_string()
}

/// 旧部署中使用的环境变量名到配置键的映射
const LEGACY_ENV: &[(&str, &str)] = &[
    ("PRODUCT_CATALOG_PORT", "server.port"),
    ("PRODUCT_CATALOG_RELOAD_INTERVAL", "catalog.reload_interval_secs"),
    ("PRODUCT_CATALOG_PRODUCTS_DIR", "catalog.products_dir"),
    ("USE_DATABASE", "catalog.use_database"),
    ("DB_CONNECTION_STRING", "database.url"),
    ("FLAGD_HOST", "feature_flags.flagd_host"),
    ("FLAGD_PORT", "feature_flags.flagd_port"),
];

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    pub fn load(config_dir: &str) -> Result<Self, ConfigError> {
        Self::from_figment(Self::figment(config_dir))
    }

    /// 构建配置源
    pub fn figment(config_dir: &str) -> Figment {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| default_app_env());

        Figment::new()
            .merge(Serialized::default("app_env", &env))
            .merge(Toml::file(format!("{}/default.toml", config_dir)))
            .merge(Toml::file(format!("{}/{}.toml", config_dir, env)))
            .merge(Env::prefixed("APP__").split("__"))
            .merge(Env::raw().filter_map(|key| {
                let upper = key.as_str().to_ascii_uppercase();
                LEGACY_ENV
                    .iter()
                    .find(|(name, _)| *name == upper)
                    .map(|(_, path)| (*path).into())
            }))
    }

    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        Ok(figment.extract()?)
    }

    /// 是否为生产环境
    pub fn is_production(&self) -> bool {
        self.app_env == "production"
    }
}
