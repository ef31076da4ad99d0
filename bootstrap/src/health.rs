//! 健康检查模块
//!
//! 提供 /health、/ready 和 /metrics 端点

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use astro_adapter_postgres::check_connection;
use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::get};
use serde::Serialize;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::metrics::MetricsRecorder;

/// 健康检查状态
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub checks: Vec<ComponentHealth>,
}

/// 组件健康状态
#[derive(Debug, Clone, Serialize)]
pub struct ComponentHealth {
    pub name: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl HealthStatus {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            checks: vec![],
        }
    }

    pub fn add_check(&mut self, check: ComponentHealth) {
        if check.status != "healthy" {
            self.status = "unhealthy".to_string();
        }
        self.checks.push(check);
    }

    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

impl ComponentHealth {
    pub fn healthy(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: "healthy".to_string(),
            message: None,
        }
    }

    pub fn unhealthy(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: "unhealthy".to_string(),
            message: Some(message.into()),
        }
    }
}

/// 健康检查器
pub struct HealthChecker {
    postgres: Option<PgPool>,
    timeout: Duration,
}

impl HealthChecker {
    pub fn new(postgres: Option<PgPool>) -> Self {
        Self {
            postgres,
            timeout: Duration::from_secs(2),
        }
    }

    /// 执行存活检查（liveness）
    ///
    /// 只检查服务是否在运行，不检查依赖
    pub async fn liveness(&self) -> HealthStatus {
        HealthStatus::healthy()
    }

    /// 执行就绪检查（readiness）
    pub async fn readiness(&self) -> HealthStatus {
        let mut status = HealthStatus::healthy();

        if let Some(pool) = &self.postgres {
            status.add_check(match check_connection(pool, self.timeout).await {
                Ok(()) => ComponentHealth::healthy("postgres"),
                Err(e) => ComponentHealth::unhealthy("postgres", e.to_string()),
            });
        }

        status
    }
}

// ============================================================================
// HTTP 健康检查服务器
// ============================================================================

#[derive(Clone)]
struct HealthServerState {
    checker: Arc<HealthChecker>,
    metrics: Option<Arc<MetricsRecorder>>,
}

/// HTTP 健康检查服务器
pub struct HealthServer {
    checker: Arc<HealthChecker>,
    metrics: Option<Arc<MetricsRecorder>>,
    port: u16,
}

impl HealthServer {
    pub fn new(checker: Arc<HealthChecker>, metrics: Option<Arc<MetricsRecorder>>, port: u16) -> Self {
        Self {
            checker,
            metrics,
            port,
        }
    }

    fn router(&self) -> Router {
        let state = HealthServerState {
            checker: self.checker.clone(),
            metrics: self.metrics.clone(),
        };

        Router::new()
            .route("/health", get(health_handler))
            .route("/ready", get(ready_handler))
            .route("/metrics", get(metrics_handler))
            .with_state(state)
    }

    /// 启动 HTTP 服务器，token 取消后退出
    pub async fn serve(self, shutdown: CancellationToken) -> Result<(), std::io::Error> {
        let app = self.router();
        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        info!(%addr, "Health check HTTP server starting");

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app)
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await
    }
}

async fn health_handler(State(state): State<HealthServerState>) -> impl IntoResponse {
    let status = state.checker.liveness().await;
    (StatusCode::OK, Json(status))
}

async fn ready_handler(State(state): State<HealthServerState>) -> impl IntoResponse {
    let status = state.checker.readiness().await;
    let code = if status.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(status))
}

async fn metrics_handler(State(state): State<HealthServerState>) -> impl IntoResponse {
    let body = state.metrics.as_ref().map(|m| m.render()).unwrap_or_default();
    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        body,
    )
}
