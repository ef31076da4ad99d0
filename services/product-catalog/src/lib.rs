//! product-catalog 服务库
//!
//! 商品目录：JSON 文件或 PostgreSQL 两种数据源，文件模式下定时重新加载

pub mod api;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;

// Proto generated code
pub mod oteldemo {
    tonic::include_proto!("oteldemo");
}

pub use oteldemo as proto;

pub const FILE_DESCRIPTOR_SET: &[u8] = tonic::include_file_descriptor_set!("product_catalog_descriptor");
