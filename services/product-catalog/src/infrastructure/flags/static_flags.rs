//! 进程内静态开关

use std::collections::HashMap;

use astro_errors::AppResult;
use astro_ports::{EvaluationContext, FeatureFlagPort};
use async_trait::async_trait;

/// 配置文件给定的开关值，未配置的开关返回默认值
#[derive(Debug, Default)]
pub struct StaticFeatureFlags {
    flags: HashMap<String, bool>,
}

impl StaticFeatureFlags {
    pub fn new(flags: HashMap<String, bool>) -> Self {
        Self { flags }
    }
}

#[async_trait]
impl FeatureFlagPort for StaticFeatureFlags {
    async fn boolean_value(
        &self,
        flag: &str,
        default: bool,
        _ctx: &EvaluationContext,
    ) -> AppResult<bool> {
        Ok(self.flags.get(flag).copied().unwrap_or(default))
    }
}
