//! 数据源模式

use std::fmt;

/// 进程级的数据源选择，启动时确定后不再变化
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataSourceMode {
    File,
    Database,
}

impl DataSourceMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::File => "json",
            Self::Database => "database",
        }
    }
}

impl fmt::Display for DataSourceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
