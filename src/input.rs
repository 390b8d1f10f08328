//! 答案檔案讀取
//!
//! 答案列表保留空字串：空白代表「略過這題」，位置對齊時仍佔一個位置。

use crate::error::{BuddiesError, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

/// 「辣,不辣,吃」「辣、吃」→ 答案列表
pub fn parse_answer_list(text: &str) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    text.split(|c: char| matches!(c, ',' | '，' | '、'))
        .map(|s| s.trim().to_string())
        .collect()
}

fn answers_from_value(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Some(s.trim().to_string()),
                Value::Null => Some(String::new()),
                _ => None,
            })
            .collect(),
        Value::String(s) => Some(parse_answer_list(s)),
        _ => None,
    }
}

/// 單人答案檔：JSON 陣列、{"answers": [...]}，或一行一個答案的純文字
pub fn load_answers_file(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        return Err(BuddiesError::FileNotFound(path.display().to_string()));
    }
    let content = std::fs::read_to_string(path)?;
    let trimmed = content.trim_start();

    if trimmed.starts_with('[') || trimmed.starts_with('{') {
        let value: Value = serde_json::from_str(trimmed)?;
        let answers = match &value {
            Value::Object(obj) => obj.get("answers"),
            other => Some(other),
        };
        return answers.and_then(answers_from_value).ok_or_else(|| {
            BuddiesError::InvalidAnswers(format!("{}: 答案必須是字串陣列", path.display()))
        });
    }

    Ok(content.lines().map(|line| line.trim().to_string()).collect())
}

/// 群組答案檔：{"成員ID": ["答案", ...], ...}
pub fn load_members_file(path: &Path) -> Result<BTreeMap<String, Vec<String>>> {
    if !path.exists() {
        return Err(BuddiesError::FileNotFound(path.display().to_string()));
    }
    let content = std::fs::read_to_string(path)?;
    parse_members(&content)
        .map_err(|e| BuddiesError::InvalidAnswers(format!("{}: {}", path.display(), e)))
}

pub fn parse_members(json: &str) -> std::result::Result<BTreeMap<String, Vec<String>>, String> {
    let value: Value = serde_json::from_str(json).map_err(|e| e.to_string())?;
    let obj = match value {
        Value::Object(obj) => obj,
        _ => return Err("成員答案必須是物件".into()),
    };

    obj.iter()
        .map(|(member, answers)| {
            answers_from_value(answers)
                .map(|list| (member.clone(), list))
                .ok_or_else(|| format!("成員 {} 的答案格式錯誤", member))
        })
        .collect()
}
