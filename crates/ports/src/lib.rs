//! ports - 抽象 trait 层
//!
//! 定义所有基础设施的抽象接口

mod feature_flag;

pub use feature_flag::*;
