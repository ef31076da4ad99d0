//! Feature flag trait 定义

use std::collections::BTreeMap;

use astro_errors::AppResult;
use async_trait::async_trait;
use serde::Serialize;

/// 开关评估上下文
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EvaluationContext {
    #[serde(rename = "targetingKey", skip_serializing_if = "Option::is_none")]
    pub targeting_key: Option<String>,
    #[serde(flatten)]
    pub attributes: BTreeMap<String, serde_json::Value>,
}

impl EvaluationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_targeting_key(mut self, key: impl Into<String>) -> Self {
        self.targeting_key = Some(key.into());
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }
}

/// 特性开关 trait
#[async_trait]
pub trait FeatureFlagPort: Send + Sync {
    /// 评估布尔开关
    ///
    /// 开关不存在时返回 `default`；后端故障返回 `Err`，由调用方决定兜底值
    async fn boolean_value(
        &self,
        flag: &str,
        default: bool,
        ctx: &EvaluationContext,
    ) -> AppResult<bool>;
}
