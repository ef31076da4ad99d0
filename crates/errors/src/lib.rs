//! astro-errors - 统一错误处理
//!
//! 所有 crate 共用的错误类型，以及到 gRPC 状态码的映射

use thiserror::Error;

/// 应用错误类型
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("External service error: {0}")]
    ExternalService(String),
}

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    pub fn external_service(msg: impl Into<String>) -> Self {
        Self::ExternalService(msg.into())
    }

    /// 是否为 NotFound
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// 转换为 gRPC 状态码
    ///
    /// 数据库、外部服务错误对调用方统一表现为 Internal
    pub fn grpc_code(&self) -> tonic::Code {
        match self {
            Self::NotFound(_) => tonic::Code::NotFound,
            Self::Internal(_) => tonic::Code::Internal,
            Self::Database(_) => tonic::Code::Internal,
            Self::ExternalService(_) => tonic::Code::Internal,
        }
    }

    /// 对外暴露的消息
    ///
    /// NotFound / Internal 原样返回，其余只返回概要，细节留在日志里
    pub fn public_message(&self) -> String {
        match self {
            Self::NotFound(msg) | Self::Internal(msg) => msg.clone(),
            Self::Database(_) => "Database operation failed".to_string(),
            Self::ExternalService(_) => "Upstream service failed".to_string(),
        }
    }
}

impl From<AppError> for tonic::Status {
    fn from(err: AppError) -> Self {
        tonic::Status::new(err.grpc_code(), err.public_message())
    }
}

/// Result 类型别名
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grpc_code_mapping() {
        assert_eq!(AppError::not_found("x").grpc_code(), tonic::Code::NotFound);
        assert_eq!(AppError::internal("x").grpc_code(), tonic::Code::Internal);
        assert_eq!(AppError::database("x").grpc_code(), tonic::Code::Internal);
        assert_eq!(
            AppError::external_service("x").grpc_code(),
            tonic::Code::Internal
        );
    }

    #[test]
    fn test_status_hides_database_detail() {
        let status: tonic::Status =
            AppError::database("password authentication failed for user shop").into();
        assert_eq!(status.code(), tonic::Code::Internal);
        assert!(!status.message().contains("password"));
    }

    #[test]
    fn test_status_keeps_not_found_message() {
        let status: tonic::Status = AppError::not_found("Product Not Found: ABC").into();
        assert_eq!(status.code(), tonic::Code::NotFound);
        assert_eq!(status.message(), "Product Not Found: ABC");
    }
}
