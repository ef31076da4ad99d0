//! 基础设施层

pub mod file;
pub mod flags;
pub mod persistence;
