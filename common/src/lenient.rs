//! 寬鬆的 JSON 解碼
//!
//! 餐廳資料由外部資料層提供，欄位型別常常不一致（數字變字串、null、
//! 座標缺漏）。這裡的函式一律不回傳錯誤，無法解讀的值視為「缺少」。

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// 數字或數字字串 → f64（非有限值視為缺少）
pub(crate) fn number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    n.filter(|v| v.is_finite())
}

/// 字串或數字 → String
pub(crate) fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub(crate) fn opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(number(&value))
}

pub(crate) fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(text(&value).unwrap_or_default())
}

pub(crate) fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(text(&value).filter(|s| !s.is_empty()))
}

/// 標籤：陣列、以逗號分隔的字串、或 null
pub(crate) fn tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let tags = match value {
        Value::Array(items) => items
            .iter()
            .filter_map(text)
            .filter(|s| !s.is_empty())
            .collect(),
        Value::String(s) => s
            .split([',', '，', '、'])
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect(),
        _ => Vec::new(),
    };
    Ok(tags)
}
