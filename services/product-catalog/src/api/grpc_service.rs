//! gRPC service implementation

use std::sync::Arc;

use astro_bootstrap::{Timer, record_grpc_request};
use astro_errors::AppError;
use tonic::{Request, Response, Status};
use tracing::error;

use crate::application::CatalogService;
use crate::proto::product_catalog_service_server::ProductCatalogService;
use crate::proto::{
    Empty, GetProductRequest, ListProductsResponse, Product, SearchProductsRequest,
    SearchProductsResponse,
};

use super::proto_converters::*;

const SERVICE_NAME: &str = "oteldemo.ProductCatalogService";

pub struct ProductCatalogServiceImpl {
    service: Arc<CatalogService>,
}

impl ProductCatalogServiceImpl {
    pub fn new(service: Arc<CatalogService>) -> Self {
        Self { service }
    }
}

/// 记录请求指标，并把错误转换为对外的 Status
///
/// 非 NotFound 的错误细节只进日志
fn finish<T>(method: &str, timer: Timer, result: Result<T, AppError>) -> Result<Response<T>, Status> {
    let status = match &result {
        Ok(_) => tonic::Code::Ok,
        Err(e) => e.grpc_code(),
    };
    record_grpc_request(SERVICE_NAME, method, &format!("{:?}", status), timer.elapsed_ms());

    result.map(Response::new).map_err(|e| {
        if !e.is_not_found() {
            error!(method, error = %e, "Request failed");
        }
        Status::from(e)
    })
}

#[tonic::async_trait]
impl ProductCatalogService for ProductCatalogServiceImpl {
    async fn list_products(
        &self,
        _request: Request<Empty>,
    ) -> Result<Response<ListProductsResponse>, Status> {
        let timer = Timer::start();
        let result = self
            .service
            .list_products()
            .await
            .map(|products| ListProductsResponse {
                products: products_to_proto(products),
            });
        finish("ListProducts", timer, result)
    }

    async fn get_product(
        &self,
        request: Request<GetProductRequest>,
    ) -> Result<Response<Product>, Status> {
        let timer = Timer::start();
        let req = request.into_inner();
        let result = self.service.get_product(&req.id).await.map(product_to_proto);
        finish("GetProduct", timer, result)
    }

    async fn search_products(
        &self,
        request: Request<SearchProductsRequest>,
    ) -> Result<Response<SearchProductsResponse>, Status> {
        let timer = Timer::start();
        let req = request.into_inner();
        let result = self
            .service
            .search_products(&req.query)
            .await
            .map(|results| SearchProductsResponse {
                results: products_to_proto(results),
            });
        finish("SearchProducts", timer, result)
    }
}
