//! 目录加载错误

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// 商品文件加载失败的原因
#[derive(Debug, Error)]
pub enum CatalogError {
    /// 目录无法列出或文件无法读取
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// 文件内容不符合商品列表格式
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// 加载任务异常退出
    #[error("catalog load task failed: {0}")]
    Task(String),
}

impl CatalogError {
    pub fn is_read(&self) -> bool {
        matches!(self, Self::Read { .. })
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }
}
