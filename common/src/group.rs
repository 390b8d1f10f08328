//! 群組推薦
//!
//! 每位成員的答案先各自對齊題目，再合併成一份答案：
//! - 基本題：逐題多數決，過半數時對計票額外加成
//! - 趣味題：不分題目，取全體最多人選的前 3 個
//! - 全部答案的選擇人數作為共識加分的計票

use crate::questions::{AnswerSheet, QuestionBank};
use crate::recommender::{ExplainedRestaurant, RecommendOptions, Recommender};
use crate::types::{Restaurant, ScoredRestaurant};
use std::collections::BTreeMap;
use tracing::debug;

/// 答案 → 選擇人數（含多數加成）
pub type AnswerTally = BTreeMap<String, f64>;

/// 合併時保留的趣味題答案數
pub const MERGED_FUN_LIMIT: usize = 3;

/// 合併結果
#[derive(Debug, Clone, Default)]
pub struct GroupMerge {
    pub sheet: AnswerSheet,
    pub tally: AnswerTally,
    pub member_count: usize,
}

/// 依首次出現順序計數
fn count_in_order<'a>(values: impl Iterator<Item = &'a str>) -> Vec<(&'a str, usize)> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for value in values {
        if value.is_empty() {
            continue;
        }
        match counts.iter_mut().find(|(v, _)| *v == value) {
            Some((_, count)) => *count += 1,
            None => counts.push((value, 1)),
        }
    }
    counts
}

/// 最多票的答案（同票時取先出現者）
fn find_majority<'a>(values: impl Iterator<Item = &'a str>) -> Option<(&'a str, usize)> {
    count_in_order(values)
        .into_iter()
        .fold(None, |best, (value, count)| match best {
            Some((_, top)) if top >= count => best,
            _ => Some((value, count)),
        })
}

/// 成員答案合併
pub fn merge_group_answers(
    sheets: &[AnswerSheet],
    bank: &QuestionBank,
    majority_boost: f64,
) -> GroupMerge {
    let member_count = sheets.len();
    let mut merge = GroupMerge {
        member_count,
        ..Default::default()
    };
    if member_count == 0 {
        return merge;
    }

    // 每個答案被幾位成員選過（同一人重複選只算一次）
    for sheet in sheets {
        let mut seen: Vec<&str> = Vec::new();
        for entry in &sheet.entries {
            let answer = entry.answer.as_str();
            if !answer.is_empty() && !seen.contains(&answer) {
                seen.push(answer);
                *merge.tally.entry(answer.to_string()).or_insert(0.0) += 1.0;
            }
        }
    }

    // 基本題：逐題多數決
    for question in bank.basic_questions() {
        let votes = sheets.iter().filter_map(|s| s.answer_for(&question.text));
        let Some((answer, count)) = find_majority(votes) else {
            continue;
        };
        if count * 2 > member_count {
            if let Some(total) = merge.tally.get_mut(answer) {
                *total += count as f64 * majority_boost;
            }
        }
        debug!(question = %question.text, answer, count, "majority answer");
        merge.sheet.push_basic(&question.text, answer);
    }

    // 趣味題：全體人氣前幾名
    let mut pooled: Vec<&str> = Vec::new();
    for sheet in sheets {
        let mut seen: Vec<&str> = Vec::new();
        for entry in sheet.fun() {
            let answer = entry.answer.as_str();
            if !answer.is_empty() && !seen.contains(&answer) {
                seen.push(answer);
                pooled.push(answer);
            }
        }
    }
    let mut fun = count_in_order(pooled.into_iter());
    fun.sort_by(|a, b| b.1.cmp(&a.1));
    for (answer, _) in fun.into_iter().take(MERGED_FUN_LIMIT) {
        merge.sheet.push_fun(None, answer);
    }

    merge
}

impl<'t> Recommender<'t> {
    /// 成員 ID → 答案列表
    pub fn recommend_for_group(
        &self,
        members: &BTreeMap<String, Vec<String>>,
        restaurants: &[Restaurant],
        options: &RecommendOptions,
    ) -> Vec<ScoredRestaurant> {
        self.explain_for_group(members, restaurants, options)
            .into_iter()
            .map(|e| e.scored)
            .collect()
    }

    pub fn explain_for_group(
        &self,
        members: &BTreeMap<String, Vec<String>>,
        restaurants: &[Restaurant],
        options: &RecommendOptions,
    ) -> Vec<ExplainedRestaurant> {
        let bank = self.effective_bank(options);
        let sheets: Vec<AnswerSheet> = members
            .values()
            .map(|answers| AnswerSheet::align(answers, &options.alignment, &bank))
            .collect();
        self.explain_for_group_sheets(&sheets, restaurants, options)
    }

    /// 已對齊好的成員答案
    pub fn recommend_for_group_sheets(
        &self,
        sheets: &[AnswerSheet],
        restaurants: &[Restaurant],
        options: &RecommendOptions,
    ) -> Vec<ScoredRestaurant> {
        self.explain_for_group_sheets(sheets, restaurants, options)
            .into_iter()
            .map(|e| e.scored)
            .collect()
    }

    pub fn explain_for_group_sheets(
        &self,
        sheets: &[AnswerSheet],
        restaurants: &[Restaurant],
        options: &RecommendOptions,
    ) -> Vec<ExplainedRestaurant> {
        if sheets.is_empty() || restaurants.is_empty() {
            return Vec::new();
        }

        let bank = self.effective_bank(options);
        let merge = merge_group_answers(sheets, &bank, self.scorer().weights().majority_boost);
        debug!(
            members = merge.member_count,
            merged = merge.sheet.len(),
            tallied = merge.tally.len(),
            "merged group answers"
        );

        // 呼叫端給的計票優先
        let mut merged_options = options.clone();
        if merged_options.group_answer_counts.is_none() {
            merged_options.group_answer_counts = Some(merge.tally);
        }
        if merged_options.user_count.is_none() {
            merged_options.user_count = Some(merge.member_count);
        }

        self.explain_sheet(&merge.sheet, restaurants, &merged_options)
    }
}

/// 以內建題庫、標籤表與預設權重做群組推薦
pub fn recommend_for_group(
    members: &BTreeMap<String, Vec<String>>,
    restaurants: &[Restaurant],
    options: &RecommendOptions,
) -> Vec<ScoredRestaurant> {
    Recommender::default().recommend_for_group(members, restaurants, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::questions::{AnswerAlignment, Q_MEAL, Q_PARTY, Q_SPICY};

    fn members(list: &[(&str, &[&str])]) -> BTreeMap<String, Vec<String>> {
        list.iter()
            .map(|(id, answers)| (id.to_string(), answers.iter().map(|a| a.to_string()).collect()))
            .collect()
    }

    fn sheets(list: &[&[(&str, &str)]]) -> Vec<AnswerSheet> {
        list.iter()
            .map(|pairs| {
                let mut sheet = AnswerSheet::new();
                for (q, a) in pairs.iter() {
                    sheet.push_basic(q, a);
                }
                sheet
            })
            .collect()
    }

    #[test]
    fn test_find_majority() {
        let values = vec!["A", "B", "A", "C", "A"];
        assert_eq!(find_majority(values.into_iter()), Some(("A", 3)));
    }

    #[test]
    fn test_find_majority_tie_first_seen() {
        let values = vec!["B", "A", "A", "B"];
        assert_eq!(find_majority(values.into_iter()), Some(("B", 2)));
    }

    #[test]
    fn test_find_majority_empty() {
        let values: Vec<&str> = vec!["", ""];
        assert_eq!(find_majority(values.into_iter()), None);
    }

    #[test]
    fn test_group_majority_party_size() {
        let bank = QuestionBank::builtin();
        let merged = merge_group_answers(
            &sheets(&[&[(Q_PARTY, "多人")], &[(Q_PARTY, "多人")], &[(Q_PARTY, "單人")]]),
            &bank,
            0.5,
        );
        assert_eq!(merged.sheet.answer_for(Q_PARTY), Some("多人"));
        assert_eq!(merged.member_count, 3);
        // 2 票過半：2 + 2 × 0.5
        assert_eq!(merged.tally.get("多人"), Some(&3.0));
        assert_eq!(merged.tally.get("單人"), Some(&1.0));
    }

    #[test]
    fn test_plurality_without_majority_not_boosted() {
        let bank = QuestionBank::builtin();
        let merged = merge_group_answers(
            &sheets(&[&[(Q_SPICY, "辣")], &[(Q_SPICY, "不辣")]]),
            &bank,
            0.5,
        );
        assert_eq!(merged.sheet.answer_for(Q_SPICY), Some("辣"));
        assert_eq!(merged.tally.get("辣"), Some(&1.0));
    }

    #[test]
    fn test_fun_top_three_by_popularity() {
        let bank = QuestionBank::builtin();
        let mut list = Vec::new();
        for fun in [&["貓派", "海", "甜"][..], &["貓派", "夜貓"], &["海", "貓派", "網美"], &["夜貓"]] {
            let mut sheet = AnswerSheet::new();
            for a in fun {
                sheet.push_fun(None, a);
            }
            list.push(sheet);
        }
        let merged = merge_group_answers(&list, &bank, 0.5);
        let fun: Vec<&str> = merged.sheet.fun().map(|e| e.answer.as_str()).collect();
        assert_eq!(fun, vec!["貓派", "海", "夜貓"]);
        assert_eq!(merged.tally.get("貓派"), Some(&3.0));
    }

    #[test]
    fn test_duplicate_answer_counted_once_per_member() {
        let bank = QuestionBank::builtin();
        let mut sheet = AnswerSheet::new();
        sheet.push_fun(None, "貓派");
        sheet.push_fun(None, "貓派");
        let merged = merge_group_answers(&[sheet], &bank, 0.5);
        assert_eq!(merged.tally.get("貓派"), Some(&1.0));
    }

    #[test]
    fn test_empty_members() {
        let catalog = vec![Restaurant::new("1", "x").with_tags(["飽足"])];
        let result = recommend_for_group(&BTreeMap::new(), &catalog, &RecommendOptions::default());
        assert!(result.is_empty());
    }

    #[test]
    fn test_group_prefers_consensus_restaurant() {
        let catalog = vec![
            Restaurant::new("mild", "清粥小菜").with_tags(["吃", "不辣", "清淡"]),
            Restaurant::new("spicy", "麻辣鍋").with_tags(["吃", "麻辣", "火鍋"]),
        ];
        let options = RecommendOptions {
            alignment: AnswerAlignment::QuestionTexts {
                texts: vec![Q_MEAL.to_string(), Q_SPICY.to_string()],
            },
            ..Default::default()
        };
        let group = members(&[
            ("amy", &["吃", "辣"]),
            ("ben", &["吃", "辣"]),
            ("cat", &["吃", "不辣"]),
        ]);

        let recommender = Recommender::default();
        let result = recommender.explain_for_group(&group, &catalog, &options);
        assert_eq!(result[0].scored.restaurant.id, "spicy");
        assert!(result[0].breakdown.consensus > 0.0);
    }

    #[test]
    fn test_group_consensus_unanimous_beats_majority() {
        let catalog = vec![Restaurant::new("spicy", "麻辣鍋").with_tags(["吃", "麻辣"])];
        let options = RecommendOptions {
            alignment: AnswerAlignment::QuestionTexts {
                texts: vec![Q_MEAL.to_string(), Q_SPICY.to_string()],
            },
            ..Default::default()
        };
        let recommender = Recommender::default();

        let unanimous = members(&[
            ("1", &["吃", "辣"]),
            ("2", &["吃", "辣"]),
            ("3", &["吃", "辣"]),
            ("4", &["吃", "辣"]),
            ("5", &["吃", "辣"]),
        ]);
        let majority = members(&[
            ("1", &["吃", "辣"]),
            ("2", &["吃", "辣"]),
            ("3", &["吃", "辣"]),
            ("4", &["吃", "不辣"]),
            ("5", &["吃", "不辣"]),
        ]);

        let a = recommender.explain_for_group(&unanimous, &catalog, &options);
        let b = recommender.explain_for_group(&majority, &catalog, &options);
        assert!(a[0].breakdown.consensus > b[0].breakdown.consensus);
    }

    #[test]
    fn test_caller_counts_take_precedence() {
        let catalog = vec![Restaurant::new("spicy", "麻辣鍋").with_tags(["吃", "麻辣"])];
        let mut counts = AnswerTally::new();
        counts.insert("辣".into(), 4.0);
        let options = RecommendOptions {
            alignment: AnswerAlignment::QuestionTexts {
                texts: vec![Q_MEAL.to_string(), Q_SPICY.to_string()],
            },
            group_answer_counts: Some(counts),
            user_count: Some(4),
            ..Default::default()
        };
        let group = members(&[("1", &["吃", "辣"])]);
        let result = Recommender::default().explain_for_group(&group, &catalog, &options);
        // (4/4)² × 3 × 4
        assert!((result[0].breakdown.consensus - 12.0).abs() < 1e-9);
    }
}
