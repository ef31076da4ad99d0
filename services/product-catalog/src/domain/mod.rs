//! 领域层
//!
//! 商品实体、目录快照、数据源模式和数据源接口

pub mod mode;
pub mod product;
pub mod snapshot;
pub mod source;

pub use mode::*;
pub use product::*;
pub use snapshot::*;
pub use source::*;
