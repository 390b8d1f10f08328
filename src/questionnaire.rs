//! 互動式問卷
//!
//! 基本題依序出題（前提不成立的條件題不出），接著是趣味題。
//! 每題都可以略過。

use crate::error::{BuddiesError, Result};
use buddies_common::{AnswerSheet, Question, QuestionBank, QuestionKind};
use dialoguer::Select;

/// 略過選項的標籤
pub const SKIP_LABEL: &str = "（略過）";

/// 選項加上略過
pub fn choice_labels(question: &Question) -> Vec<String> {
    let mut labels: Vec<String> = question
        .options
        .iter()
        .map(|o| o.trim().to_string())
        .filter(|o| !o.is_empty())
        .collect();
    labels.push(SKIP_LABEL.to_string());
    labels
}

/// 選擇結果記到答案表（略過則不記）
pub fn record_choice(sheet: &mut AnswerSheet, question: &Question, labels: &[String], index: usize) {
    let Some(label) = labels.get(index) else {
        return;
    };
    if label == SKIP_LABEL {
        return;
    }
    match question.kind {
        QuestionKind::Basic => sheet.push_basic(&question.text, label),
        QuestionKind::Fun => sheet.push_fun(Some(&question.text), label),
    }
}

fn prompt_choice(question: &Question, labels: &[String]) -> Result<usize> {
    Select::new()
        .with_prompt(&question.text)
        .items(labels)
        .default(0)
        .interact()
        .map_err(|e| BuddiesError::Prompt(e.to_string()))
}

/// 互動式回答整份題庫
pub fn run_questionnaire(bank: &QuestionBank) -> Result<AnswerSheet> {
    let mut sheet = AnswerSheet::new();
    let basic: Vec<&Question> = bank.basic_questions().collect();
    let fun: Vec<&Question> = bank.fun_questions().collect();

    println!("📝 基本題（{}題）", basic.len());
    for question in basic {
        if !sheet.prerequisite_met(question) {
            continue;
        }
        let labels = choice_labels(question);
        let index = prompt_choice(question, &labels)?;
        record_choice(&mut sheet, question, &labels, index);
    }

    if !fun.is_empty() {
        println!("\n🎲 趣味題（{}題）", fun.len());
    }
    for question in fun {
        let labels = choice_labels(question);
        let index = prompt_choice(question, &labels)?;
        record_choice(&mut sheet, question, &labels, index);
    }

    println!("\n✔ 回答了 {} 題\n", sheet.len());
    Ok(sheet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use buddies_common::questions::{Q_MEAL, Q_PORTION};

    #[test]
    fn test_choice_labels_append_skip() {
        let question = Question::basic("吃一點還是吃飽？", &["吃一點", " ", "吃飽"]);
        assert_eq!(choice_labels(&question), vec!["吃一點", "吃飽", SKIP_LABEL]);
    }

    /// 條件題：前提不成立就不出題
    #[test]
    fn test_conditional_question_skipped() {
        let bank = QuestionBank::builtin();
        let portion = bank.find(Q_PORTION).unwrap();

        let mut sheet = AnswerSheet::new();
        assert!(!sheet.prerequisite_met(portion));

        sheet.push_basic(Q_MEAL, "喝");
        assert!(!sheet.prerequisite_met(portion));

        let mut sheet = AnswerSheet::new();
        sheet.push_basic(Q_MEAL, "吃");
        assert!(sheet.prerequisite_met(portion));
    }

    #[test]
    fn test_record_choice() {
        let bank = QuestionBank::builtin();
        let meal = bank.find(Q_MEAL).unwrap();
        let labels = choice_labels(meal);

        let mut sheet = AnswerSheet::new();
        record_choice(&mut sheet, meal, &labels, labels.len() - 1);
        assert!(sheet.is_empty());

        record_choice(&mut sheet, meal, &labels, 0);
        assert_eq!(sheet.answer_for(Q_MEAL), Some("吃"));

        let fun = bank.fun_questions().next().unwrap();
        let labels = choice_labels(fun);
        record_choice(&mut sheet, fun, &labels, 1);
        assert_eq!(sheet.fun().count(), 1);
    }
}
