//! 評分權重設定
//!
//! 權重在建立 [`Scorer`](crate::scorer::Scorer) 時注入，之後不再變動。
//! 測試或設定檔可以提供另一組權重。

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// 評分權重
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScoringWeights {
    /// 分數下限，每間餐廳至少得到這個分數
    pub min_score: f64,
    /// 每個基本題命中的加分
    pub basic_match: f64,
    /// 趣味題完全命中的加分（部分命中按比例）
    pub fun_match: f64,
    /// 群組共識加分係數
    pub group_consensus: f64,
    /// 評分（0 到 5）的權重
    pub rating: f64,
    /// 評論數、按讚數的權重
    pub popularity: f64,
    /// 距離加分的權重
    pub distance: f64,
    /// 評論數的飽和上限
    pub review_count_cap: f64,
    /// 按讚數的飽和上限
    pub like_count_cap: f64,
    /// 距離加分的範圍（公里），超過即為 0
    pub distance_horizon_km: f64,
    /// 「附近吃」的半徑（公里）
    pub near_radius_km: f64,
    /// 過半數共識時，對多數答案計票的額外加成比例
    pub majority_boost: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            min_score: 1.0,
            basic_match: 10.0,
            fun_match: 5.0,
            group_consensus: 3.0,
            rating: 4.0,
            popularity: 2.0,
            distance: 3.0,
            review_count_cap: 500.0,
            like_count_cap: 200.0,
            distance_horizon_km: 10.0,
            near_radius_km: 3.0,
            majority_boost: 0.5,
        }
    }
}

impl ScoringWeights {
    /// JSON 字串讀取（缺少的欄位使用預設值）
    pub fn from_json(json: &str) -> Result<Self> {
        let weights: Self = serde_json::from_str(json)?;
        weights.validate()?;
        Ok(weights)
    }

    /// 預設門檻：下限的兩倍
    pub fn default_threshold(&self) -> f64 {
        self.min_score * 2.0
    }

    /// 權重必須是有限的非負數，且上限類數值必須大於 0
    pub fn validate(&self) -> Result<()> {
        let named = [
            ("minScore", self.min_score),
            ("basicMatch", self.basic_match),
            ("funMatch", self.fun_match),
            ("groupConsensus", self.group_consensus),
            ("rating", self.rating),
            ("popularity", self.popularity),
            ("distance", self.distance),
            ("majorityBoost", self.majority_boost),
        ];
        for (name, value) in named {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::Config(format!("權重 {} 不可為負數或非數值: {}", name, value)));
            }
        }

        let caps = [
            ("reviewCountCap", self.review_count_cap),
            ("likeCountCap", self.like_count_cap),
            ("distanceHorizonKm", self.distance_horizon_km),
            ("nearRadiusKm", self.near_radius_km),
        ];
        for (name, value) in caps {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::Config(format!("{} 必須大於 0: {}", name, value)));
            }
        }

        Ok(())
    }
}
