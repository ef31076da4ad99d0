//! 服务启动器
//!
//! 提供统一的服务启动模式

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use astro_config::AppConfig;
use astro_errors::AppResult;
use tokio_util::sync::CancellationToken;
use tonic::transport::Server;
use tonic::transport::server::Router;
use tracing::{error, info, warn};

use crate::health::{HealthChecker, HealthServer};
use crate::infrastructure::Infrastructure;
use crate::metrics::MetricsRecorder;
use crate::runtime::{cancel_on_shutdown, init_runtime};

/// 关闭时等待后台任务的时间
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// 健康检查端口：gRPC 端口 + 1000
pub fn health_port(grpc_port: u16) -> u16 {
    grpc_port.checked_add(1000).unwrap_or(grpc_port.wrapping_sub(1000))
}

/// 运行 gRPC 服务
///
/// 1. 加载配置
/// 2. 初始化运行时（日志）
/// 3. 创建基础设施资源（数据库可选）
/// 4. 启动健康检查 HTTP 服务器
/// 5. 调用闭包注册 gRPC 服务
/// 6. 启动服务器，收到信号后关闭并等待后台任务
///
/// # 示例
///
/// ```ignore
/// run_with_services("config", |infra, mut server| async move {
///     Ok(server.add_service(MyServiceServer::new(MyService::new(infra.postgres_pool()))))
/// })
/// .await
/// ```
pub async fn run_with_services<F, Fut>(
    config_dir: &str,
    server_builder: F,
) -> Result<(), Box<dyn std::error::Error>>
where
    F: FnOnce(Infrastructure, Server) -> Fut,
    Fut: Future<Output = AppResult<Router>>,
{
    // 1. 加载配置
    let config = AppConfig::load(config_dir)?;

    // 2. 初始化运行时
    init_runtime(&config);

    info!("Starting {} service", config.app_name);

    let metrics = match MetricsRecorder::install() {
        Ok(recorder) => Some(Arc::new(recorder)),
        Err(e) => {
            warn!(error = %e, "Metrics recorder unavailable");
            None
        }
    };

    let shutdown = CancellationToken::new();
    let signal_handle = cancel_on_shutdown(shutdown.clone());

    // 3. 创建基础设施
    let infra = Infrastructure::from_config(config.clone(), shutdown.clone()).await;

    // 4. 启动健康检查 HTTP 服务器
    let health_server = HealthServer::new(
        Arc::new(HealthChecker::new(infra.postgres_pool())),
        metrics,
        health_port(config.server.port),
    );
    let health_token = shutdown.clone();
    let health_handle = tokio::spawn(async move {
        if let Err(e) = health_server.serve(health_token).await {
            error!("Health server error: {}", e);
        }
    });

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    // 5. 让服务注册自己的 gRPC 实现
    let router = server_builder(infra.clone(), Server::builder()).await?;

    info!(%addr, "gRPC server starting");

    // 6. 启动服务器
    let serve_token = shutdown.clone();
    let result = router
        .serve_with_shutdown(addr, async move { serve_token.cancelled().await })
        .await;

    infra.shutdown(SHUTDOWN_GRACE).await;
    signal_handle.abort();
    let _ = health_handle.await;

    result?;
    info!("Service stopped");

    Ok(())
}
