//! 餐廳與推薦結果的型別定義
//!
//! - Restaurant: 外部資料層提供的餐廳資料（唯讀）
//! - GeoPoint: 經緯度
//! - PriceTier / Spiciness: 價位與辣度
//! - ScoredRestaurant: 附上 matchScore 的推薦結果

use crate::lenient;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// 經緯度
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// 有限值且在合法範圍內
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }

    fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let lat = obj.get("lat").or_else(|| obj.get("latitude"))?;
        let lng = obj
            .get("lng")
            .or_else(|| obj.get("lon"))
            .or_else(|| obj.get("longitude"))?;
        let point = Self::new(lenient::number(lat)?, lenient::number(lng)?);
        point.is_valid().then_some(point)
    }
}

/// 價位等級（1~4）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PriceTier(u8);

impl PriceTier {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 4;

    pub fn new(level: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&level).then_some(Self(level))
    }

    pub fn level(&self) -> u8 {
        self.0
    }

    /// 1~2 為平價
    pub fn is_affordable(&self) -> bool {
        self.0 <= 2
    }

    /// 3~4 為奢華
    pub fn is_luxury(&self) -> bool {
        self.0 >= 3
    }

    /// 正規化用的標籤
    pub fn label(&self) -> &'static str {
        if self.is_affordable() {
            "平價"
        } else {
            "奢華"
        }
    }

    /// 數字、「$$」、low/mid/high、低/中/高 等表記
    pub fn parse(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return None;
        }
        if let Ok(n) = trimmed.parse::<f64>() {
            if n.is_finite() {
                return Self::new(n.round().clamp(0.0, 255.0) as u8);
            }
        }
        if trimmed.chars().all(|c| c == '$') {
            return u8::try_from(trimmed.len()).ok().and_then(Self::new);
        }
        match trimmed.to_lowercase().as_str() {
            "low" | "cheap" | "低" | "平價" => Some(Self(1)),
            "mid" | "medium" | "中" => Some(Self(2)),
            "high" | "高" | "奢華" => Some(Self(3)),
            "premium" | "luxury" | "頂級" => Some(Self(4)),
            _ => None,
        }
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(_) => lenient::number(value)
                .filter(|n| *n >= 0.0)
                .and_then(|n| Self::new(n.round().min(255.0) as u8)),
            Value::String(s) => Self::parse(s),
            _ => None,
        }
    }
}

impl Serialize for PriceTier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.0)
    }
}

impl<'de> Deserialize<'de> for PriceTier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(&value)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid price tier: {}", value)))
    }
}

/// 辣度（辣 / 不辣 / 都有 / 不明）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Spiciness {
    Spicy,
    NotSpicy,
    Both,
    #[default]
    Unknown,
}

impl Spiciness {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "true" | "yes" | "spicy" | "辣" | "有辣" => Spiciness::Spicy,
            "false" | "no" | "notspicy" | "not_spicy" | "mild" | "不辣" => Spiciness::NotSpicy,
            "both" | "all" | "皆可" | "都有" | "可調辣度" => Spiciness::Both,
            _ => Spiciness::Unknown,
        }
    }

    fn from_value(value: &Value) -> Self {
        match value {
            Value::Bool(true) => Spiciness::Spicy,
            Value::Bool(false) => Spiciness::NotSpicy,
            Value::String(s) => Self::parse(s),
            _ => Spiciness::Unknown,
        }
    }

    /// 正規化用的標籤（「都有」兩個都加）
    pub fn labels(&self) -> &'static [&'static str] {
        match self {
            Spiciness::Spicy => &["辣"],
            Spiciness::NotSpicy => &["不辣"],
            Spiciness::Both => &["辣", "不辣"],
            Spiciness::Unknown => &[],
        }
    }
}

impl<'de> Deserialize<'de> for Spiciness {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&value))
    }
}

fn lenient_price<'de, D>(deserializer: D) -> Result<Option<PriceTier>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(PriceTier::from_value(&value))
}

fn lenient_location<'de, D>(deserializer: D) -> Result<Option<GeoPoint>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(GeoPoint::from_value(&value))
}

/// 餐廳資料
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Restaurant {
    #[serde(deserialize_with = "lenient::string")]
    pub id: String,

    #[serde(deserialize_with = "lenient::string")]
    pub name: String,

    /// 自由文字的類型（例如「日式、拉麵」）
    #[serde(alias = "type", deserialize_with = "lenient::string")]
    pub category: String,

    #[serde(
        alias = "priceRange",
        deserialize_with = "lenient_price",
        skip_serializing_if = "Option::is_none"
    )]
    pub price_level: Option<PriceTier>,

    /// 0 到 5
    #[serde(deserialize_with = "lenient::opt_f64", skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,

    #[serde(deserialize_with = "lenient::opt_f64", skip_serializing_if = "Option::is_none")]
    pub review_count: Option<f64>,

    #[serde(deserialize_with = "lenient::opt_f64", skip_serializing_if = "Option::is_none")]
    pub like_count: Option<f64>,

    #[serde(deserialize_with = "lenient_location", skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,

    #[serde(deserialize_with = "lenient::tags")]
    pub tags: Vec<String>,

    #[serde(alias = "isSpicy")]
    pub spicy: Spiciness,

    /// 建議人數（例如「1~4」）
    #[serde(deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub suggested_people: Option<String>,
}

impl Restaurant {
    /// 測試與 CLI 用的簡易建構函式
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

/// 推薦結果（每次請求重新產生）
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredRestaurant {
    #[serde(flatten)]
    pub restaurant: Restaurant,
    pub match_score: f64,
}
