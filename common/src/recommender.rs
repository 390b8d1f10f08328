//! 單人推薦
//!
//! 答案列表 → 對齊題目 → 解析 → 逐間評分 → 排序 → 門檻過濾 → 必要時退回前 N 名。

use crate::answers::{ConsensusTally, ResolvedAnswers};
use crate::group::AnswerTally;
use crate::questions::{AnswerAlignment, AnswerSheet, Question, QuestionBank};
use crate::scorer::{ScoreBreakdown, Scorer, ScoringContext};
use crate::types::{GeoPoint, Restaurant, ScoredRestaurant};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::cmp::Ordering;
use tracing::debug;

/// 沒有任何餐廳通過門檻時退回的筆數
pub const DEFAULT_FALLBACK_LIMIT: usize = 10;

/// 推薦選項
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecommendOptions {
    /// 答案與題目的對齊方式
    pub alignment: AnswerAlignment,
    /// 取代題庫中的基本題（分類與條件題判斷都依此）
    pub basic_questions: Option<Vec<Question>>,
    pub user_location: Option<GeoPoint>,
    /// 有任何基本題不符就不推薦，且硬性條件下不退回
    pub strict_basic_match: bool,
    /// 門檻（預設為分數下限的兩倍）
    pub min_score_threshold: Option<f64>,
    /// 群組計票：答案 → 選擇人數
    pub group_answer_counts: Option<AnswerTally>,
    /// 共識加分的總人數
    pub user_count: Option<usize>,
    pub fallback_limit: usize,
}

impl Default for RecommendOptions {
    fn default() -> Self {
        Self {
            alignment: AnswerAlignment::default(),
            basic_questions: None,
            user_location: None,
            strict_basic_match: false,
            min_score_threshold: None,
            group_answer_counts: None,
            user_count: None,
            fallback_limit: DEFAULT_FALLBACK_LIMIT,
        }
    }
}

/// 推薦結果與分數明細
#[derive(Debug, Clone, Serialize)]
pub struct ExplainedRestaurant {
    #[serde(flatten)]
    pub scored: ScoredRestaurant,
    pub breakdown: ScoreBreakdown,
}

/// 推薦器
#[derive(Debug, Clone)]
pub struct Recommender<'t> {
    scorer: Scorer<'t>,
    bank: &'t QuestionBank,
}

impl Default for Recommender<'static> {
    fn default() -> Self {
        Self::new(Scorer::default(), QuestionBank::builtin_ref())
    }
}

impl<'t> Recommender<'t> {
    pub fn new(scorer: Scorer<'t>, bank: &'t QuestionBank) -> Self {
        Self { scorer, bank }
    }

    pub fn scorer(&self) -> &Scorer<'t> {
        &self.scorer
    }

    pub fn bank(&self) -> &'t QuestionBank {
        self.bank
    }

    /// 這次請求使用的題庫
    pub(crate) fn effective_bank(&self, options: &RecommendOptions) -> Cow<'t, QuestionBank> {
        match &options.basic_questions {
            Some(basic) if !basic.is_empty() => Cow::Owned(self.bank.with_basic_questions(basic)),
            _ => Cow::Borrowed(self.bank),
        }
    }

    /// 依答案順序推薦
    pub fn recommend_for_individual(
        &self,
        answers: &[String],
        restaurants: &[Restaurant],
        options: &RecommendOptions,
    ) -> Vec<ScoredRestaurant> {
        strip(self.explain_for_individual(answers, restaurants, options))
    }

    /// [`Self::recommend_for_individual`] 附上分數明細
    pub fn explain_for_individual(
        &self,
        answers: &[String],
        restaurants: &[Restaurant],
        options: &RecommendOptions,
    ) -> Vec<ExplainedRestaurant> {
        let bank = self.effective_bank(options);
        let sheet = AnswerSheet::align(answers, &options.alignment, &bank);
        self.rank(&sheet, &bank, restaurants, options)
    }

    /// 已配對好的答案直接推薦
    pub fn recommend_sheet(
        &self,
        sheet: &AnswerSheet,
        restaurants: &[Restaurant],
        options: &RecommendOptions,
    ) -> Vec<ScoredRestaurant> {
        strip(self.explain_sheet(sheet, restaurants, options))
    }

    pub fn explain_sheet(
        &self,
        sheet: &AnswerSheet,
        restaurants: &[Restaurant],
        options: &RecommendOptions,
    ) -> Vec<ExplainedRestaurant> {
        let bank = self.effective_bank(options);
        self.rank(sheet, &bank, restaurants, options)
    }

    fn rank(
        &self,
        sheet: &AnswerSheet,
        bank: &QuestionBank,
        restaurants: &[Restaurant],
        options: &RecommendOptions,
    ) -> Vec<ExplainedRestaurant> {
        if restaurants.is_empty() {
            return Vec::new();
        }

        let tags = self.scorer.tags();
        let answers = ResolvedAnswers::resolve(sheet, bank, tags);
        let tally = options
            .group_answer_counts
            .as_ref()
            .filter(|counts| !counts.is_empty())
            .map(|counts| {
                let members = options.user_count.unwrap_or_else(|| largest_count(counts));
                ConsensusTally::resolve(counts, members, tags)
            });

        let ctx = ScoringContext {
            user_location: options.user_location.filter(GeoPoint::is_valid),
            strict_basic_match: options.strict_basic_match,
            consensus: tally.as_ref(),
        };

        let mut candidates: Vec<ExplainedRestaurant> = restaurants
            .iter()
            .filter_map(|restaurant| {
                let breakdown = self.scorer.explain(restaurant, &answers, &ctx);
                if breakdown.disqualified() {
                    return None;
                }
                Some(ExplainedRestaurant {
                    scored: ScoredRestaurant {
                        restaurant: restaurant.clone(),
                        match_score: breakdown.total,
                    },
                    breakdown,
                })
            })
            .collect();

        let dropped = restaurants.len() - candidates.len();
        debug!(
            total = restaurants.len(),
            dropped,
            basic = answers.basic.len(),
            fun = answers.fun.len(),
            gated = answers.gated,
            "scored catalog"
        );

        if candidates.is_empty() {
            debug!("hard filters removed every restaurant");
            return Vec::new();
        }

        // 穩定排序：同分時保留輸入順序
        candidates.sort_by(|a, b| {
            b.scored
                .match_score
                .partial_cmp(&a.scored.match_score)
                .unwrap_or(Ordering::Equal)
        });

        let threshold = options
            .min_score_threshold
            .unwrap_or_else(|| self.scorer.weights().default_threshold());
        let passed = candidates
            .iter()
            .take_while(|c| c.scored.match_score >= threshold)
            .count();

        if passed > 0 {
            debug!(threshold, passed, "threshold applied");
            candidates.truncate(passed);
            return candidates;
        }

        if options.strict_basic_match && answers.has_hard_constraint() {
            debug!(threshold, "strict mode, no fallback");
            return Vec::new();
        }

        let limit = options.fallback_limit.max(1);
        debug!(threshold, limit, "nothing passed threshold, falling back to top results");
        candidates.truncate(limit);
        candidates
    }
}

/// 沒有指定人數時，以最多人選的答案票數當總人數
fn largest_count(counts: &AnswerTally) -> usize {
    counts
        .values()
        .filter(|c| c.is_finite())
        .fold(0.0_f64, |top, c| top.max(*c))
        .ceil() as usize
}

fn strip(explained: Vec<ExplainedRestaurant>) -> Vec<ScoredRestaurant> {
    explained.into_iter().map(|e| e.scored).collect()
}

/// 以內建題庫、標籤表與預設權重推薦
pub fn recommend_for_individual(
    answers: &[String],
    restaurants: &[Restaurant],
    options: &RecommendOptions,
) -> Vec<ScoredRestaurant> {
    Recommender::default().recommend_for_individual(answers, restaurants, options)
}
