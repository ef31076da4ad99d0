//! 宽松的环境变量值解析
//!
//! 环境变量经 figment 解析后可能是字符串、整数、浮点数或布尔值

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum Raw {
    Bool(bool),
    Int(i64),
    Str(String),
    /// 浮点数、超出范围的整数等其余形态
    Other(IgnoredAny),
}

/// `true` / `1`（大小写不敏感）为真，其余为假
pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Raw::deserialize(deserializer)? {
        Raw::Bool(b) => b,
        Raw::Int(i) => i == 1,
        Raw::Str(s) => {
            let s = s.trim();
            s.eq_ignore_ascii_case("true") || s == "1"
        }
        Raw::Other(_) => false,
    })
}

/// 无法解析为整数时取 0
pub fn int<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Raw::deserialize(deserializer)? {
        Raw::Bool(_) => 0,
        Raw::Int(i) => i,
        Raw::Str(s) => s.trim().parse().unwrap_or(0),
        Raw::Other(_) => 0,
    })
}
