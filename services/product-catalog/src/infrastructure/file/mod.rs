//! 基于 JSON 文件的商品目录

mod loader;
mod source;
mod store;

pub use loader::ProductFileLoader;
pub use source::FileCatalogSource;
pub use store::CatalogStore;
