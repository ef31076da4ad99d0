//! astro-bootstrap - 统一服务启动骨架
//!
//! 所有服务复用的启动逻辑

mod grpc_health;
mod health;
mod infrastructure;
mod metrics;
mod reflection;
mod retry;
mod runtime;
mod starter;

pub use grpc_health::*;
pub use health::*;
pub use infrastructure::*;
pub use metrics::*;
pub use reflection::*;
pub use retry::*;
pub use runtime::*;
pub use starter::*;
