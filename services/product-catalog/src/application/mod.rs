//! 应用层

mod catalog_service;

pub use catalog_service::*;
