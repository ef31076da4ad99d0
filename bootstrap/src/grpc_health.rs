//! gRPC 标准健康检查服务（grpc.health.v1.Health）

use tonic::server::NamedService;
use tonic_health::pb::health_server::{Health, HealthServer as GrpcHealthServer};
use tonic_health::server::{HealthReporter, health_reporter};

/// 构建健康检查服务，并把 `S` 标记为 SERVING
///
/// 整体状态（空服务名）默认即为 SERVING
pub async fn grpc_health_service<S>() -> (HealthReporter, GrpcHealthServer<impl Health>)
where
    S: NamedService,
{
    let (reporter, service) = health_reporter();
    reporter.set_serving::<S>().await;
    (reporter, service)
}
