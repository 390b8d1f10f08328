//! 答案的語意解析
//!
//! 答案字串在每次請求只解析一次，變成型別化的 [`AnswerKind`]。
//! 評分時對每間餐廳只做比對，不再重新解析字串。

use crate::profile::{RestaurantProfile, DRINK_TOKEN, FULL_MEAL_TOKEN, LIGHT_MEAL_TOKEN};
use crate::questions::{AnswerSheet, QuestionBank};
use crate::tags::TagTables;
use crate::types::Spiciness;
use crate::weights::ScoringWeights;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PartySize {
    Solo,
    Group,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Budget {
    Affordable,
    Luxury,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MealKind {
    Eat,
    Drink,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Portion {
    Light,
    Full,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DistancePreference {
    Near,
    Far,
}

/// 基本題答案的語意
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum AnswerKind {
    PartySize(PartySize),
    Budget(Budget),
    Meal(MealKind),
    Portion(Portion),
    Spicy(bool),
    Distance(DistancePreference),
    /// 其他答案：對照表（或字面）標籤任一命中即可
    FreeformTag(Vec<String>),
}

/// 比對結果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MatchOutcome {
    Match,
    Mismatch,
    /// 餐廳沒有相關資訊，不計入
    Unknown,
}

impl MatchOutcome {
    fn from_bool(matched: bool) -> Self {
        if matched {
            MatchOutcome::Match
        } else {
            MatchOutcome::Mismatch
        }
    }
}

/// 硬性條件：不符合的餐廳直接淘汰
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum HardConstraint {
    /// 只要飲品店
    DrinkOnly,
    /// 只要輕食
    LightMeal,
    /// 只要正餐
    FullMeal,
}

impl HardConstraint {
    /// 餐廳必須帶有的標準 token
    pub fn required_token(&self) -> &'static str {
        match self {
            HardConstraint::DrinkOnly => DRINK_TOKEN,
            HardConstraint::LightMeal => LIGHT_MEAL_TOKEN,
            HardConstraint::FullMeal => FULL_MEAL_TOKEN,
        }
    }

    pub fn admits(&self, profile: &RestaurantProfile<'_>) -> bool {
        profile.has_exact(self.required_token())
    }
}

impl std::fmt::Display for HardConstraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HardConstraint::DrinkOnly => write!(f, "喝"),
            HardConstraint::LightMeal => write!(f, "吃一點"),
            HardConstraint::FullMeal => write!(f, "吃飽"),
        }
    }
}

impl AnswerKind {
    /// 基本題答案轉成型別（已知選項以外一律做標籤比對）
    pub fn parse_basic(answer: &str, tags: &TagTables) -> Self {
        match answer.trim() {
            "單人" => AnswerKind::PartySize(PartySize::Solo),
            "多人" => AnswerKind::PartySize(PartySize::Group),
            "平價美食" | "平價" => AnswerKind::Budget(Budget::Affordable),
            "奢華美食" | "奢華" => AnswerKind::Budget(Budget::Luxury),
            "吃" => AnswerKind::Meal(MealKind::Eat),
            "喝" => AnswerKind::Meal(MealKind::Drink),
            "吃一點" => AnswerKind::Portion(Portion::Light),
            "吃飽" => AnswerKind::Portion(Portion::Full),
            "辣" => AnswerKind::Spicy(true),
            "不辣" => AnswerKind::Spicy(false),
            "附近吃" | "附近" => AnswerKind::Distance(DistancePreference::Near),
            "遠一點" => AnswerKind::Distance(DistancePreference::Far),
            other => AnswerKind::FreeformTag(tags.basic_tags(other)),
        }
    }

    /// 是否為已知的基本題選項（型別化或收錄在基本題對照表）
    pub fn is_known_basic(answer: &str, tags: &TagTables) -> bool {
        !matches!(Self::parse_basic(answer, tags), AnswerKind::FreeformTag(_))
            || tags.is_basic_answer(answer)
    }

    pub fn hard_constraint(&self) -> Option<HardConstraint> {
        match self {
            AnswerKind::Meal(MealKind::Drink) => Some(HardConstraint::DrinkOnly),
            AnswerKind::Portion(Portion::Light) => Some(HardConstraint::LightMeal),
            AnswerKind::Portion(Portion::Full) => Some(HardConstraint::FullMeal),
            _ => None,
        }
    }

    /// 與餐廳比對
    ///
    /// `distance_km` 只有在使用者位置與餐廳座標都存在時才是 Some。
    pub fn evaluate(
        &self,
        profile: &RestaurantProfile<'_>,
        distance_km: Option<f64>,
        tags: &TagTables,
        weights: &ScoringWeights,
    ) -> MatchOutcome {
        match self {
            AnswerKind::PartySize(size) => {
                if let Some(range) = profile.party() {
                    return MatchOutcome::from_bool(match size {
                        PartySize::Solo => range.fits_solo(),
                        PartySize::Group => range.fits_group(),
                    });
                }
                let key = match size {
                    PartySize::Solo => "單人",
                    PartySize::Group => "多人",
                };
                if profile.matches_any(&tags.basic_tags(key)) {
                    MatchOutcome::Match
                } else {
                    MatchOutcome::Unknown
                }
            }
            AnswerKind::Budget(budget) => {
                if let Some(tier) = profile.restaurant.price_level {
                    return MatchOutcome::from_bool(match budget {
                        Budget::Affordable => tier.is_affordable(),
                        Budget::Luxury => tier.is_luxury(),
                    });
                }
                let affordable = profile.matches_any(&tags.basic_tags("平價美食"));
                let luxury = profile.matches_any(&tags.basic_tags("奢華美食"));
                let (wanted, other) = match budget {
                    Budget::Affordable => (affordable, luxury),
                    Budget::Luxury => (luxury, affordable),
                };
                if wanted {
                    MatchOutcome::Match
                } else if other {
                    MatchOutcome::Mismatch
                } else {
                    MatchOutcome::Unknown
                }
            }
            AnswerKind::Meal(MealKind::Eat) => {
                if profile.tokens().is_empty() {
                    MatchOutcome::Unknown
                } else {
                    MatchOutcome::from_bool(!profile.is_drink_only())
                }
            }
            AnswerKind::Meal(MealKind::Drink) => {
                MatchOutcome::from_bool(profile.has_exact(DRINK_TOKEN))
            }
            AnswerKind::Portion(Portion::Light) => {
                MatchOutcome::from_bool(profile.has_exact(LIGHT_MEAL_TOKEN))
            }
            AnswerKind::Portion(Portion::Full) => {
                MatchOutcome::from_bool(profile.has_exact(FULL_MEAL_TOKEN))
            }
            AnswerKind::Spicy(wants_spicy) => match profile.spiciness() {
                Spiciness::Both => MatchOutcome::Match,
                Spiciness::Spicy => MatchOutcome::from_bool(*wants_spicy),
                Spiciness::NotSpicy => MatchOutcome::from_bool(!*wants_spicy),
                Spiciness::Unknown => MatchOutcome::Unknown,
            },
            AnswerKind::Distance(pref) => match (pref, distance_km) {
                (_, None) => MatchOutcome::Unknown,
                (DistancePreference::Near, Some(d)) => {
                    MatchOutcome::from_bool(d <= weights.near_radius_km)
                }
                // 遠一點＝距離不拘
                (DistancePreference::Far, Some(_)) => MatchOutcome::Match,
            },
            AnswerKind::FreeformTag(candidates) => {
                MatchOutcome::from_bool(profile.matches_any(candidates))
            }
        }
    }
}

/// 解析後的基本題答案
#[derive(Debug, Clone, Serialize)]
pub struct BasicAnswer {
    pub answer: String,
    pub kind: AnswerKind,
}

/// 解析後的趣味題答案
#[derive(Debug, Clone, Serialize)]
pub struct FunAnswer {
    pub answer: String,
    pub tags: Vec<String>,
}

impl FunAnswer {
    pub fn new(answer: &str, tags: &TagTables) -> Self {
        Self {
            answer: answer.trim().to_string(),
            tags: tags.fun_tags(answer),
        }
    }

    /// 命中率 0.0~1.0
    pub fn match_level(&self, profile: &RestaurantProfile<'_>) -> f64 {
        if self.tags.is_empty() {
            return 0.0;
        }
        let found = profile.count_matches(&self.tags);
        (found as f64 / self.tags.len() as f64).min(1.0)
    }
}

/// 一次請求的解析結果
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResolvedAnswers {
    pub basic: Vec<BasicAnswer>,
    pub fun: Vec<FunAnswer>,
    /// 條件題前提不成立而略過的答案數
    pub gated: usize,
}

impl ResolvedAnswers {
    /// 解析配對好的答案（含條件題的前提檢查）
    pub fn resolve(sheet: &AnswerSheet, bank: &QuestionBank, tags: &TagTables) -> Self {
        let mut resolved = Self::default();

        for entry in sheet.basic() {
            if entry.answer.is_empty() {
                continue;
            }
            if !sheet.dependency_met(entry, bank) {
                resolved.gated += 1;
                continue;
            }
            resolved.basic.push(BasicAnswer {
                answer: entry.answer.clone(),
                kind: AnswerKind::parse_basic(&entry.answer, tags),
            });
        }

        for entry in sheet.fun() {
            if entry.answer.is_empty() {
                continue;
            }
            resolved.fun.push(FunAnswer::new(&entry.answer, tags));
        }

        resolved
    }

    /// 答案中的硬性條件（不重複）
    pub fn constraints(&self) -> Vec<HardConstraint> {
        let mut out = Vec::new();
        for c in self.basic.iter().filter_map(|b| b.kind.hard_constraint()) {
            if !out.contains(&c) {
                out.push(c);
            }
        }
        out
    }

    pub fn has_hard_constraint(&self) -> bool {
        self.basic.iter().any(|b| b.kind.hard_constraint().is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.basic.is_empty() && self.fun.is_empty()
    }
}

/// 共識計票的一項
#[derive(Debug, Clone, Serialize)]
pub enum ConsensusKind {
    Basic(AnswerKind),
    Fun(FunAnswer),
}

#[derive(Debug, Clone, Serialize)]
pub struct ConsensusEntry {
    pub answer: String,
    pub count: f64,
    pub kind: ConsensusKind,
}

/// 解析後的群組計票
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConsensusTally {
    pub entries: Vec<ConsensusEntry>,
    /// 正規化用的人數（至少 1）
    pub member_count: f64,
}

impl ConsensusTally {
    pub fn resolve(counts: &BTreeMap<String, f64>, member_count: usize, tags: &TagTables) -> Self {
        let entries = counts
            .iter()
            .filter(|(answer, count)| !answer.trim().is_empty() && count.is_finite() && **count > 0.0)
            .map(|(answer, count)| {
                let kind = if AnswerKind::is_known_basic(answer, tags) {
                    ConsensusKind::Basic(AnswerKind::parse_basic(answer, tags))
                } else {
                    ConsensusKind::Fun(FunAnswer::new(answer, tags))
                };
                ConsensusEntry {
                    answer: answer.trim().to_string(),
                    count: *count,
                    kind,
                }
            })
            .collect();

        Self {
            entries,
            member_count: member_count.max(1) as f64,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
