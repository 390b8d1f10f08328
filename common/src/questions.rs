//! 題庫與答案對齊
//!
//! 使用者的答案是一串依出題順序排列的字串。條件題可能被略過，所以
//! 「第 N 個答案對應哪一題」必須由呼叫端明確指定（[`AnswerAlignment`]），
//! 對齊一次後得到 [`AnswerSheet`]（題目 ↔ 答案的配對）。

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 預設的基本題數（內建題庫的基本題數）
pub const DEFAULT_BASIC_COUNT: usize = 6;

/// 題目分類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QuestionKind {
    /// 基本題（硬性條件）
    Basic,
    /// 趣味題（軟性偏好）
    Fun,
}

/// 條件題：前一題必須是指定答案才計分
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub question: String,
    pub answer: String,
}

/// 題目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub text: String,
    pub kind: QuestionKind,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<Dependency>,
}

impl Question {
    pub fn basic(text: &str, options: &[&str]) -> Self {
        Self {
            text: text.into(),
            kind: QuestionKind::Basic,
            options: options.iter().map(|o| o.to_string()).collect(),
            depends_on: None,
        }
    }

    pub fn fun(text: &str, options: &[&str]) -> Self {
        Self {
            kind: QuestionKind::Fun,
            ..Self::basic(text, options)
        }
    }

    pub fn depends_on(mut self, question: &str, answer: &str) -> Self {
        self.depends_on = Some(Dependency {
            question: question.into(),
            answer: answer.into(),
        });
        self
    }
}

pub const Q_PARTY: &str = "今天是一個人還是有朋友？";
pub const Q_BUDGET: &str = "想吃奢華點還是平價？";
pub const Q_MEAL: &str = "想吃正餐還是想喝飲料？";
pub const Q_PORTION: &str = "吃一點還是吃飽？";
pub const Q_SPICY: &str = "想吃辣的還是不辣？";
pub const Q_DISTANCE: &str = "附近吃還是遠一點？";

/// 題庫
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuestionBank {
    pub questions: Vec<Question>,
}

lazy_static::lazy_static! {
    static ref BUILTIN: QuestionBank = QuestionBank::builtin();
}

impl QuestionBank {
    /// 內建題庫（共用的靜態實例）
    pub fn builtin_ref() -> &'static QuestionBank {
        &BUILTIN
    }

    /// 內建題庫：基本題 6 題、趣味題 8 題
    pub fn builtin() -> Self {
        let questions = vec![
            Question::basic(Q_PARTY, &["單人", "多人"]),
            Question::basic(Q_BUDGET, &["奢華美食", "平價美食"]),
            Question::basic(Q_MEAL, &["吃", "喝"]),
            Question::basic(Q_PORTION, &["吃一點", "吃飽"]).depends_on(Q_MEAL, "吃"),
            Question::basic(Q_SPICY, &["辣", "不辣"]).depends_on(Q_MEAL, "吃"),
            Question::basic(Q_DISTANCE, &["附近吃", "遠一點"]),
            Question::fun("貓派還是狗派？", &["貓派", "狗派"]),
            Question::fun("早鳥還是夜貓？", &["早鳥", "夜貓"]),
            Question::fun("山還是海？", &["山", "海"]),
            Question::fun("甜還是鹹？", &["甜", "鹹"]),
            Question::fun("I人還是E人？", &["I人", "E人"]),
            Question::fun("異國料理還是在地美食？", &["異國", "在地"]),
            Question::fun("網美店還是實在店？", &["網美", "實在"]),
            Question::fun("想冒險還是選安全牌？", &["冒險", "安全牌"]),
        ];
        Self { questions }
    }

    /// JSON 檔案讀取
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// JSON 字串讀取（題目陣列或 {"questions": [...]}）
    pub fn from_json(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let bank = if value.is_array() {
            Self { questions: serde_json::from_value(value)? }
        } else {
            serde_json::from_value(value)?
        };
        bank.validate()?;
        Ok(bank)
    }

    fn validate(&self) -> Result<()> {
        for q in &self.questions {
            if q.text.trim().is_empty() {
                return Err(Error::Config("題目文字不可為空".into()));
            }
            if let Some(dep) = &q.depends_on {
                if self.find(&dep.question).is_none() {
                    return Err(Error::Config(format!(
                        "「{}」依賴的題目不存在: {}",
                        q.text, dep.question
                    )));
                }
            }
        }
        Ok(())
    }

    /// 以呼叫端提供的基本題取代目前的基本題（趣味題保留）
    pub fn with_basic_questions(&self, basic: &[Question]) -> Self {
        let mut questions: Vec<Question> = basic
            .iter()
            .cloned()
            .map(|mut q| {
                q.kind = QuestionKind::Basic;
                q
            })
            .collect();
        questions.extend(self.fun_questions().cloned());
        Self { questions }
    }

    pub fn basic_questions(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter().filter(|q| q.kind == QuestionKind::Basic)
    }

    pub fn fun_questions(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter().filter(|q| q.kind == QuestionKind::Fun)
    }

    /// 依題目文字查詢（忽略前後空白）
    pub fn find(&self, text: &str) -> Option<&Question> {
        let key = text.trim();
        self.questions.iter().find(|q| q.text.trim() == key)
    }

    /// 題目文字是否為基本題
    pub fn is_basic(&self, text: &str) -> bool {
        self.find(text).map(|q| q.kind == QuestionKind::Basic).unwrap_or(false)
    }
}

/// 答案與題目的對齊方式（由呼叫端明確選擇）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnswerAlignment {
    /// 答案索引 → 題目文字
    #[serde(rename_all = "camelCase")]
    IndexMap { map: BTreeMap<usize, String> },
    /// 與答案平行的題目文字陣列
    #[serde(rename_all = "camelCase")]
    QuestionTexts { texts: Vec<String> },
    /// 依出題順序：最多 basic_count 個答案依序對應基本題，
    /// 前提不成立的條件題會跳過，其餘答案為趣味題
    #[serde(rename_all = "camelCase")]
    Positional { basic_count: usize },
}

impl Default for AnswerAlignment {
    fn default() -> Self {
        AnswerAlignment::Positional {
            basic_count: DEFAULT_BASIC_COUNT,
        }
    }
}

/// 對齊後的一筆答案
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnsweredQuestion {
    /// 題目文字（趣味題可能不明）
    pub question: Option<String>,
    pub kind: QuestionKind,
    pub answer: String,
}

/// 題目 ↔ 答案的配對
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerSheet {
    pub entries: Vec<AnsweredQuestion>,
}

impl AnswerSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_basic(&mut self, question: &str, answer: &str) {
        self.entries.push(AnsweredQuestion {
            question: Some(question.to_string()),
            kind: QuestionKind::Basic,
            answer: answer.trim().to_string(),
        });
    }

    pub fn push_fun(&mut self, question: Option<&str>, answer: &str) {
        self.entries.push(AnsweredQuestion {
            question: question.map(str::to_string),
            kind: QuestionKind::Fun,
            answer: answer.trim().to_string(),
        });
    }

    /// 依對齊方式把答案列表轉成配對。空白答案（略過的題目）不收錄
    pub fn align(answers: &[String], alignment: &AnswerAlignment, bank: &QuestionBank) -> Self {
        let mut sheet = Self::new();

        match alignment {
            AnswerAlignment::IndexMap { map } => {
                for (i, answer) in answers.iter().enumerate() {
                    sheet.push_by_text(map.get(&i).map(String::as_str), answer, bank);
                }
            }
            AnswerAlignment::QuestionTexts { texts } => {
                for (i, answer) in answers.iter().enumerate() {
                    sheet.push_by_text(texts.get(i).map(String::as_str), answer, bank);
                }
            }
            AnswerAlignment::Positional { basic_count } => {
                sheet.push_positional(answers, *basic_count, bank);
            }
        }

        sheet
    }

    fn push_by_text(&mut self, text: Option<&str>, answer: &str, bank: &QuestionBank) {
        if answer.trim().is_empty() {
            return;
        }
        match text {
            Some(t) if bank.is_basic(t) => self.push_basic(t.trim(), answer),
            _ => self.push_fun(text.map(str::trim), answer),
        }
    }

    fn push_positional(&mut self, answers: &[String], basic_count: usize, bank: &QuestionBank) {
        let mut basic = bank.basic_questions();
        let mut consumed = 0;
        let mut rest = answers.iter();

        while consumed < basic_count {
            let Some(question) = next_applicable(&mut basic, self) else {
                break;
            };
            let Some(answer) = rest.next() else {
                break;
            };
            consumed += 1;
            if !answer.trim().is_empty() {
                self.push_basic(&question.text, answer);
            }
        }

        for answer in rest {
            if !answer.trim().is_empty() {
                self.push_fun(None, answer);
            }
        }
    }

    /// 某題的答案
    pub fn answer_for(&self, question: &str) -> Option<&str> {
        let key = question.trim();
        self.entries
            .iter()
            .find(|e| e.question.as_deref().map(str::trim) == Some(key))
            .map(|e| e.answer.as_str())
    }

    pub fn basic(&self) -> impl Iterator<Item = &AnsweredQuestion> {
        self.entries.iter().filter(|e| e.kind == QuestionKind::Basic)
    }

    pub fn fun(&self) -> impl Iterator<Item = &AnsweredQuestion> {
        self.entries.iter().filter(|e| e.kind == QuestionKind::Fun)
    }

    /// 題目的前提是否成立（沒有前提的題目一律成立）
    pub fn prerequisite_met(&self, question: &Question) -> bool {
        match &question.depends_on {
            Some(dep) => self.answer_for(&dep.question) == Some(dep.answer.trim()),
            None => true,
        }
    }

    /// 已作答的條件題前提是否成立（不在題庫中的題目一律成立）
    pub fn dependency_met(&self, entry: &AnsweredQuestion, bank: &QuestionBank) -> bool {
        entry
            .question
            .as_deref()
            .and_then(|t| bank.find(t))
            .map_or(true, |question| self.prerequisite_met(question))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// 下一個會出的基本題（前提不成立的條件題跳過）
fn next_applicable<'q, I>(questions: &mut I, sheet: &AnswerSheet) -> Option<&'q Question>
where
    I: Iterator<Item = &'q Question>,
{
    questions.find(|q| sheet.prerequisite_met(q))
}
