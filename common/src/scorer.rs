//! 單一餐廳的匹配評分
//!
//! ## 評分流程
//! 1. 分數從下限 `min_score` 開始
//! 2. 硬性條件（喝 / 吃一點 / 吃飽）不符 → 淘汰，停在下限
//! 3. 基本題：命中一題加 `basic_match`
//! 4. 嚴格模式下有任何不符 → 下限
//! 5. 有基本題但一題都沒中 → 下限
//! 6. 趣味題：命中率 × `fun_match`（部分命中按比例）
//! 7. 群組共識：(選的人數 / 總人數)² × `group_consensus` × 總人數
//! 8. 評分、評論數、按讚數
//! 9. 距離：(1 - min(d, horizon) / horizon) × `distance`
//! 10. 基本題全中且至少一題 → 再加 `basic_match` 的一半
//!
//! 缺少或格式錯誤的餐廳欄位一律視為「沒有貢獻」，評分不會失敗。

use crate::answers::{ConsensusKind, ConsensusTally, HardConstraint, MatchOutcome, ResolvedAnswers};
use crate::distance::{haversine_km, proximity};
use crate::profile::RestaurantProfile;
use crate::tags::TagTables;
use crate::types::{GeoPoint, Restaurant};
use crate::weights::ScoringWeights;
use serde::Serialize;
use tracing::trace;

/// 評分時的請求情境
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoringContext<'a> {
    pub user_location: Option<GeoPoint>,
    pub strict_basic_match: bool,
    pub consensus: Option<&'a ConsensusTally>,
}

/// 提早結束的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EarlyExit {
    /// 硬性條件不符
    HardFilter(HardConstraint),
    /// 嚴格模式下有不符的基本題
    StrictMismatch,
    /// 基本題一題都沒中
    NoBasicMatch,
}

/// 各項目的分數明細
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub total: f64,
    pub floor: f64,
    pub basic: f64,
    pub fun: f64,
    pub consensus: f64,
    pub rating: f64,
    pub popularity: f64,
    pub distance: f64,
    pub completeness: f64,
    /// 命中的基本題數
    pub matched: usize,
    /// 明確不符的基本題數
    pub mismatched: usize,
    /// 可判斷的基本題數（命中 + 不符），嚴格模式與明細用
    pub considered: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub early_exit: Option<EarlyExit>,
}

impl ScoreBreakdown {
    /// 是否因硬性條件被淘汰
    pub fn disqualified(&self) -> bool {
        matches!(self.early_exit, Some(EarlyExit::HardFilter(_)))
    }

    fn floored(mut self, exit: EarlyExit) -> Self {
        self.early_exit = Some(exit);
        self.total = self.floor;
        self
    }
}

/// 評分器：權重與標籤表在建立時固定
#[derive(Debug, Clone)]
pub struct Scorer<'t> {
    weights: ScoringWeights,
    tags: &'t TagTables,
}

impl Default for Scorer<'static> {
    fn default() -> Self {
        Self::new(ScoringWeights::default(), TagTables::builtin_ref())
    }
}

impl<'t> Scorer<'t> {
    pub fn new(weights: ScoringWeights, tags: &'t TagTables) -> Self {
        Self { weights, tags }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    pub fn tags(&self) -> &'t TagTables {
        self.tags
    }

    /// 只取總分
    pub fn score(
        &self,
        restaurant: &Restaurant,
        answers: &ResolvedAnswers,
        ctx: &ScoringContext<'_>,
    ) -> f64 {
        self.explain(restaurant, answers, ctx).total
    }

    /// 分數與明細
    pub fn explain(
        &self,
        restaurant: &Restaurant,
        answers: &ResolvedAnswers,
        ctx: &ScoringContext<'_>,
    ) -> ScoreBreakdown {
        let w = &self.weights;
        let floor = w.min_score.max(0.0);
        let profile = RestaurantProfile::build(restaurant);
        let distance_km = match (ctx.user_location, restaurant.location) {
            (Some(user), Some(here)) if user.is_valid() && here.is_valid() => {
                Some(haversine_km(user, here))
            }
            _ => None,
        };

        let mut b = ScoreBreakdown {
            total: floor,
            floor,
            distance_km,
            ..Default::default()
        };

        // 硬性條件
        for constraint in answers.constraints() {
            if !constraint.admits(&profile) {
                trace!(restaurant = %restaurant.name, %constraint, "hard filter");
                return b.floored(EarlyExit::HardFilter(constraint));
            }
        }

        // 基本題
        for answer in &answers.basic {
            match answer.kind.evaluate(&profile, distance_km, self.tags, w) {
                MatchOutcome::Match => {
                    b.basic += w.basic_match;
                    b.matched += 1;
                    b.considered += 1;
                }
                MatchOutcome::Mismatch => {
                    b.mismatched += 1;
                    b.considered += 1;
                }
                MatchOutcome::Unknown => {}
            }
        }

        if ctx.strict_basic_match && b.mismatched > 0 {
            return b.floored(EarlyExit::StrictMismatch);
        }
        // 無法判斷的答案也算沒中
        if !answers.basic.is_empty() && b.matched == 0 {
            return b.floored(EarlyExit::NoBasicMatch);
        }

        // 趣味題
        for fun in &answers.fun {
            b.fun += fun.match_level(&profile) * w.fun_match;
        }

        // 群組共識
        if let Some(tally) = ctx.consensus {
            b.consensus = self.consensus_bonus(tally, &profile, distance_km);
        }

        // 品質
        if let Some(rating) = restaurant.rating {
            b.rating = (rating.clamp(0.0, 5.0) / 5.0) * w.rating;
        }
        b.popularity = capped_ratio(restaurant.review_count, w.review_count_cap) * w.popularity
            + capped_ratio(restaurant.like_count, w.like_count_cap) * w.popularity;

        // 距離
        if let Some(d) = distance_km {
            b.distance = proximity(d, w.distance_horizon_km) * w.distance;
        }

        // 基本題全中（無法判斷的答案不算中）
        if !answers.basic.is_empty() && b.matched == answers.basic.len() {
            b.completeness = w.basic_match * 0.5;
        }

        let total = floor
            + b.basic
            + b.fun
            + b.consensus
            + b.rating
            + b.popularity
            + b.distance
            + b.completeness;
        b.total = if total.is_finite() { total.max(floor) } else { floor };

        trace!(restaurant = %restaurant.name, score = b.total, matched = b.matched, "scored");
        b
    }

    fn consensus_bonus(
        &self,
        tally: &ConsensusTally,
        profile: &RestaurantProfile<'_>,
        distance_km: Option<f64>,
    ) -> f64 {
        let members = tally.member_count;
        tally
            .entries
            .iter()
            .filter(|entry| match &entry.kind {
                ConsensusKind::Basic(kind) => {
                    kind.evaluate(profile, distance_km, self.tags, &self.weights)
                        == MatchOutcome::Match
                }
                ConsensusKind::Fun(fun) => fun.match_level(profile) > 0.0,
            })
            .map(|entry| {
                let share = entry.count / members;
                share * share * self.weights.group_consensus * members
            })
            .sum()
    }
}

/// min(value, cap) / cap（沒有值或負數為 0）
fn capped_ratio(value: Option<f64>, cap: f64) -> f64 {
    match value {
        Some(v) if v.is_finite() && v > 0.0 && cap > 0.0 => v.min(cap) / cap,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answers::{AnswerKind, BasicAnswer, FunAnswer};
    use crate::types::Spiciness;
    use std::collections::BTreeMap;

    fn resolved(basic: &[&str], fun: &[&str]) -> ResolvedAnswers {
        let tags = TagTables::builtin_ref();
        ResolvedAnswers {
            basic: basic
                .iter()
                .map(|a| BasicAnswer {
                    answer: a.to_string(),
                    kind: AnswerKind::parse_basic(a, tags),
                })
                .collect(),
            fun: fun.iter().map(|a| FunAnswer::new(a, tags)).collect(),
            gated: 0,
        }
    }

    fn ctx() -> ScoringContext<'static> {
        ScoringContext::default()
    }

    #[test]
    fn test_floor_for_empty_restaurant() {
        let scorer = Scorer::default();
        let r = Restaurant::default();
        let answers = resolved(&["單人", "辣"], &["貓派"]);
        assert!(scorer.score(&r, &answers, &ctx()) >= 1.0);
    }

    #[test]
    fn test_floor_with_no_answers() {
        let scorer = Scorer::default();
        let r = Restaurant::new("1", "x").with_tags(["飽足"]);
        let answers = ResolvedAnswers::default();
        assert_eq!(scorer.score(&r, &answers, &ctx()), 1.0);
    }

    #[test]
    fn test_hard_filter_drink() {
        let scorer = Scorer::default();
        let mut steak = Restaurant::new("1", "牛排館").with_tags(["牛排", "飽足"]);
        steak.rating = Some(5.0);
        let answers = resolved(&["喝"], &[]);
        let b = scorer.explain(&steak, &answers, &ctx());
        assert!(b.disqualified());
        assert_eq!(b.total, 1.0);
        assert_eq!(b.early_exit, Some(EarlyExit::HardFilter(HardConstraint::DrinkOnly)));
    }

    #[test]
    fn test_basic_match_adds_weight() {
        let scorer = Scorer::default();
        let spicy = Restaurant::new("1", "a").with_tags(["麻辣"]);
        let mild = Restaurant::new("2", "b").with_tags(["吃", "不辣"]);
        let answers = resolved(&["吃", "辣"], &[]);

        let a = scorer.explain(&spicy, &answers, &ctx());
        let b = scorer.explain(&mild, &answers, &ctx());
        assert_eq!(a.matched, 2);
        assert_eq!(b.matched, 1);
        assert_eq!(b.mismatched, 1);
        assert_eq!(a.basic - b.basic, 10.0);
    }

    #[test]
    fn test_strict_mismatch_floors() {
        let scorer = Scorer::default();
        let r = Restaurant::new("1", "a").with_tags(["飽足", "不辣"]);
        let answers = resolved(&["吃", "辣"], &[]);
        let strict = ScoringContext {
            strict_basic_match: true,
            ..Default::default()
        };
        let b = scorer.explain(&r, &answers, &strict);
        assert_eq!(b.total, 1.0);
        assert_eq!(b.early_exit, Some(EarlyExit::StrictMismatch));
        assert!(!b.disqualified());
    }

    #[test]
    fn test_no_basic_match_floors_even_with_rating() {
        let scorer = Scorer::default();
        let mut r = Restaurant::new("1", "a").with_tags(["不辣", "安靜", "咖啡"]);
        r.rating = Some(5.0);
        r.review_count = Some(10_000.0);
        let answers = resolved(&["辣"], &["貓派"]);
        let b = scorer.explain(&r, &answers, &ctx());
        assert_eq!(b.total, 1.0);
        assert_eq!(b.early_exit, Some(EarlyExit::NoBasicMatch));
    }

    #[test]
    fn test_unknown_answers_floor_popular_restaurant() {
        let scorer = Scorer::default();
        let mut ramen = Restaurant::new("1", "拉麵屋").with_tags(["拉麵"]);
        ramen.rating = Some(5.0);
        ramen.review_count = Some(500.0);
        let answers = resolved(&["單人", "平價美食", "辣"], &[]);

        let b = scorer.explain(&ramen, &answers, &ctx());
        assert_eq!(b.matched, 0);
        assert_eq!(b.considered, 0);
        assert_eq!(b.total, 1.0);
        assert_eq!(b.early_exit, Some(EarlyExit::NoBasicMatch));
    }

    #[test]
    fn test_completeness_needs_every_answer() {
        let scorer = Scorer::default();
        let answers = resolved(&["單人", "平價美食", "吃", "吃飽", "辣"], &[]);
        let bare = Restaurant::new("1", "a").with_tags(["飽足"]);
        let honest = Restaurant::new("2", "b").with_tags(["飽足", "不辣"]);

        let a = scorer.explain(&bare, &answers, &ctx());
        let b = scorer.explain(&honest, &answers, &ctx());
        assert_eq!(a.matched, 2);
        assert_eq!(a.completeness, 0.0);
        assert_eq!(b.mismatched, 1);
        assert!(a.total <= b.total);
    }

    #[test]
    fn test_fun_partial_credit() {
        let scorer = Scorer::default();
        let r = Restaurant::new("1", "a").with_tags(["安靜", "文青", "燒肉"]);
        let answers = resolved(&[], &["貓派"]);
        let b = scorer.explain(&r, &answers, &ctx());
        assert!((b.fun - 0.5 * 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_rating_monotonic() {
        let scorer = Scorer::default();
        let answers = resolved(&["吃"], &[]);
        let mut low = Restaurant::new("1", "a").with_tags(["飽足"]);
        low.rating = Some(3.0);
        let mut high = low.clone();
        high.rating = Some(5.0);
        assert!(scorer.score(&high, &answers, &ctx()) >= scorer.score(&low, &answers, &ctx()));
    }

    #[test]
    fn test_malformed_rating_no_contribution() {
        let scorer = Scorer::default();
        let r: Restaurant =
            serde_json::from_str(r#"{"name": "a", "tags": ["飽足"], "rating": "很好吃"}"#).unwrap();
        let b = scorer.explain(&r, &resolved(&["吃"], &[]), &ctx());
        assert_eq!(b.rating, 0.0);
    }

    #[test]
    fn test_popularity_capped() {
        let scorer = Scorer::default();
        let mut r = Restaurant::new("1", "a");
        r.review_count = Some(100_000.0);
        r.like_count = Some(-5.0);
        let b = scorer.explain(&r, &ResolvedAnswers::default(), &ctx());
        assert_eq!(b.popularity, 2.0);
    }

    #[test]
    fn test_distance_bonus_nearer_is_higher() {
        let scorer = Scorer::default();
        let user = GeoPoint::new(25.0330, 121.5654);
        let mut near = Restaurant::new("1", "near");
        near.location = Some(GeoPoint::new(25.0340, 121.5660));
        let mut far = Restaurant::new("2", "far");
        far.location = Some(GeoPoint::new(25.0800, 121.5654));
        let c = ScoringContext {
            user_location: Some(user),
            ..Default::default()
        };
        let answers = ResolvedAnswers::default();
        let a = scorer.explain(&near, &answers, &c);
        let b = scorer.explain(&far, &answers, &c);
        assert!(a.distance > b.distance);
        assert!(a.distance_km.unwrap() < 1.0);
    }

    #[test]
    fn test_completeness_bonus() {
        let scorer = Scorer::default();
        let mut r = Restaurant::new("1", "a").with_tags(["飽足", "麻辣"]);
        r.spicy = Spiciness::Spicy;
        let b = scorer.explain(&r, &resolved(&["吃", "吃飽", "辣"], &[]), &ctx());
        assert_eq!(b.matched, 3);
        assert_eq!(b.completeness, 5.0);

        let b = scorer.explain(&r, &resolved(&["吃", "吃飽", "不辣"], &[]), &ctx());
        assert_eq!(b.completeness, 0.0);
    }

    #[test]
    fn test_consensus_monotonic() {
        let scorer = Scorer::default();
        let tags = TagTables::builtin_ref();
        let r = Restaurant::new("1", "a").with_tags(["麻辣", "飽足"]);
        let answers = resolved(&["吃"], &[]);

        let bonus_for = |count: f64| {
            let mut counts = BTreeMap::new();
            counts.insert("辣".to_string(), count);
            let tally = ConsensusTally::resolve(&counts, 5, tags);
            let c = ScoringContext {
                consensus: Some(&tally),
                ..Default::default()
            };
            scorer.explain(&r, &answers, &c).consensus
        };

        let unanimous = bonus_for(5.0);
        let majority = bonus_for(3.0);
        assert!((unanimous - 15.0).abs() < 1e-9);
        assert!((majority - 5.4).abs() < 1e-9);
        assert!(unanimous > majority);
    }

    #[test]
    fn test_custom_weights_injected() {
        let tags = TagTables::builtin_ref();
        let weights = ScoringWeights {
            basic_match: 100.0,
            ..Default::default()
        };
        let scorer = Scorer::new(weights, tags);
        let r = Restaurant::new("1", "a").with_tags(["麻辣"]);
        let b = scorer.explain(&r, &resolved(&["辣"], &[]), &ctx());
        assert_eq!(b.basic, 100.0);
        assert_eq!(b.completeness, 50.0);
    }
}
