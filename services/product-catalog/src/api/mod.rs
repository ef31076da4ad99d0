//! gRPC 接口层

mod grpc_service;
mod proto_converters;
mod router;

pub use grpc_service::ProductCatalogServiceImpl;
pub use proto_converters::*;
pub use router::catalog_router;
