//! gRPC 路由组装

use std::sync::Arc;

use astro_bootstrap::{build_reflection, grpc_health_service};
use astro_errors::{AppError, AppResult};
use tonic::transport::Server;
use tonic::transport::server::Router;

use super::ProductCatalogServiceImpl;
use crate::FILE_DESCRIPTOR_SET;
use crate::application::CatalogService;
use crate::proto::product_catalog_service_server::ProductCatalogServiceServer;

/// 目录服务、grpc.health.v1.Health 与反射服务
pub async fn catalog_router(mut server: Server, service: Arc<CatalogService>) -> AppResult<Router> {
    let (_reporter, health_service) =
        grpc_health_service::<ProductCatalogServiceServer<ProductCatalogServiceImpl>>().await;

    let reflection_service = build_reflection(&[FILE_DESCRIPTOR_SET])
        .map_err(|e| AppError::internal(format!("failed to build reflection service: {}", e)))?;

    Ok(server
        .add_service(ProductCatalogServiceServer::new(ProductCatalogServiceImpl::new(service)))
        .add_service(health_service)
        .add_service(reflection_service))
}
