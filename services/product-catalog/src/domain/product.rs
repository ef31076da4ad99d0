//! 商品实体
//!
//! JSON 形态与 protobuf 的 JSON 映射一致：字段名既接受 lowerCamelCase 也接受原始字段名，
//! 64 位整数既可以是数字也可以是字符串，未知字段视为格式错误。

use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// 价格
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct Money {
    #[serde(alias = "currency_code")]
    pub currency_code: String,
    #[serde(deserialize_with = "proto_int")]
    pub units: i64,
    #[serde(deserialize_with = "proto_int")]
    pub nanos: i32,
}

impl Money {
    pub fn new(currency_code: impl Into<String>, units: i64, nanos: i32) -> Self {
        Self {
            currency_code: currency_code.into(),
            units,
            nanos,
        }
    }
}

/// 商品
///
/// 加载后不可变，快照整体替换
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    pub picture: String,
    #[serde(alias = "price_usd", deserialize_with = "nullable")]
    pub price_usd: Money,
    #[serde(deserialize_with = "nullable")]
    pub categories: Vec<String>,
}

impl Product {
    /// 名称或描述包含查询串（大小写不敏感）
    ///
    /// `needle` 需已转为小写；空串匹配所有商品
    pub fn matches_lowercase(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle) || self.description.to_lowercase().contains(needle)
    }
}

/// 商品文件的顶层结构
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ProductList {
    #[serde(deserialize_with = "nullable")]
    pub products: Vec<Product>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IntOrString<T> {
    Int(T),
    Str(String),
}

/// 整数字段：数字或十进制字符串
fn proto_int<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr + Default,
    T::Err: Display,
{
    match Option::<IntOrString<T>>::deserialize(deserializer)? {
        None => Ok(T::default()),
        Some(IntOrString::Int(v)) => Ok(v),
        Some(IntOrString::Str(s)) => s.parse().map_err(serde::de::Error::custom),
    }
}

/// `null` 视为默认值
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
