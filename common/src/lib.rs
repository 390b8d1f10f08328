//! Buddies 推薦引擎
//!
//! 問卷答案（單人或群組）+ 餐廳清單 → 排序過的推薦結果。
//! 純計算，不做 I/O（標籤表、題庫、權重的 JSON 載入除外）。

pub mod answers;
pub mod distance;
pub mod error;
pub mod group;
mod lenient;
pub mod profile;
pub mod questions;
pub mod recommender;
pub mod scorer;
pub mod tags;
pub mod types;
pub mod weights;

pub use answers::{AnswerKind, HardConstraint, MatchOutcome, ResolvedAnswers};
pub use distance::haversine_km;
pub use error::{Error, Result};
pub use group::{merge_group_answers, recommend_for_group, AnswerTally, GroupMerge};
pub use questions::{AnswerAlignment, AnswerSheet, Question, QuestionBank, QuestionKind};
pub use recommender::{recommend_for_individual, ExplainedRestaurant, RecommendOptions, Recommender};
pub use scorer::{EarlyExit, ScoreBreakdown, Scorer, ScoringContext};
pub use tags::TagTables;
pub use types::{GeoPoint, PriceTier, Restaurant, ScoredRestaurant, Spiciness};
pub use weights::ScoringWeights;
