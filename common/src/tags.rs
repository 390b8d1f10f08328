//! 標籤對照表
//!
//! 答案選項 → 餐廳標籤同義詞。基本題與趣味題各自一個命名空間。
//! 對照表沒有收錄的答案，退回以答案本身做字面（子字串）比對。

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 「喝」的同義詞（任一命中即視為飲品店）
pub const DRINK_SYNONYMS: &[&str] = &[
    "喝", "飲料", "飲品", "手搖飲", "茶飲", "奶茶", "咖啡", "酒吧", "調酒", "果汁",
];

/// 「吃一點」的同義詞
pub const LIGHT_MEAL_SYNONYMS: &[&str] = &[
    "輕食", "吃一點", "小吃", "點心", "甜點", "下午茶", "早午餐", "小點",
];

/// 「吃飽」的同義詞
pub const FULL_MEAL_SYNONYMS: &[&str] = &[
    "飽足", "吃飽", "正餐", "套餐", "吃到飽", "火鍋", "燒肉", "便當", "定食", "合菜",
];

/// 辣的同義詞（「不辣」另外處理）
pub const SPICY_SYNONYMS: &[&str] = &["辣", "麻辣", "川菜", "重口味", "泰式", "韓式"];

/// 不辣的同義詞
pub const NOT_SPICY_SYNONYMS: &[&str] = &["不辣", "清淡", "原味"];

/// 標籤對照表
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TagTables {
    /// 基本題答案 → 標籤
    #[serde(default)]
    pub basic: BTreeMap<String, Vec<String>>,
    /// 趣味題答案 → 標籤
    #[serde(default)]
    pub fun: BTreeMap<String, Vec<String>>,
}

lazy_static::lazy_static! {
    static ref BUILTIN: TagTables = TagTables::builtin();
}

fn entry(table: &mut BTreeMap<String, Vec<String>>, answer: &str, tags: &[&str]) {
    table.insert(answer.into(), tags.iter().map(|t| t.to_string()).collect());
}

impl TagTables {
    /// 內建對照表（共用的靜態實例）
    pub fn builtin_ref() -> &'static TagTables {
        &BUILTIN
    }

    /// 內建對照表
    pub fn builtin() -> Self {
        let mut tables = Self::default();

        // 基本題
        let basic = &mut tables.basic;
        entry(basic, "單人", &["單人", "一人", "個人", "獨食"]);
        entry(basic, "多人", &["多人", "聚餐", "團體", "分享", "合菜"]);
        entry(basic, "平價美食", &["平價", "便宜", "銅板", "小吃"]);
        entry(basic, "奢華美食", &["奢華", "高級", "精緻", "高檔", "約會"]);
        entry(basic, "吃", &["吃", "餐廳", "美食"]);
        entry(basic, "喝", DRINK_SYNONYMS);
        entry(basic, "吃一點", LIGHT_MEAL_SYNONYMS);
        entry(basic, "吃飽", FULL_MEAL_SYNONYMS);
        entry(basic, "辣", SPICY_SYNONYMS);
        entry(basic, "不辣", NOT_SPICY_SYNONYMS);
        entry(basic, "附近吃", &["附近", "順路"]);
        entry(basic, "遠一點", &["遠一點", "踩點", "景觀", "郊區"]);

        // 趣味題
        let fun = &mut tables.fun;
        entry(fun, "貓派", &["安靜", "文青", "咖啡", "甜點"]);
        entry(fun, "狗派", &["熱鬧", "戶外", "燒烤", "聚餐"]);
        entry(fun, "早鳥", &["早午餐", "早餐", "咖啡", "輕食"]);
        entry(fun, "夜貓", &["宵夜", "深夜", "酒吧", "居酒屋"]);
        entry(fun, "海", &["海鮮", "壽司", "生魚片", "魚"]);
        entry(fun, "山", &["山產", "火鍋", "燒烤", "野菜"]);
        entry(fun, "甜", &["甜點", "甜品", "蛋糕", "冰品"]);
        entry(fun, "鹹", &["鹹食", "滷味", "鹹酥雞", "炸物"]);
        entry(fun, "I人", &["安靜", "包廂", "單人", "獨食"]);
        entry(fun, "E人", &["熱鬧", "聚餐", "酒吧", "分享"]);
        entry(fun, "異國", &["日式", "韓式", "泰式", "義式", "美式"]);
        entry(fun, "在地", &["台式", "小吃", "夜市", "古早味"]);
        entry(fun, "網美", &["網美", "拍照", "景觀", "裝潢"]);
        entry(fun, "實在", &["實在", "份量", "平價", "老店"]);
        entry(fun, "冒險", &["創意", "特色", "新開幕", "異國"]);
        entry(fun, "安全牌", &["連鎖", "老店", "人氣", "排隊"]);

        tables
    }

    /// JSON 檔案讀取
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// JSON 字串讀取
    pub fn from_json(json: &str) -> Result<Self> {
        let tables: Self = serde_json::from_str(json)?;
        tables.validate()?;
        Ok(tables)
    }

    fn validate(&self) -> Result<()> {
        for (answer, tags) in self.basic.iter().chain(self.fun.iter()) {
            if tags.iter().all(|t| t.trim().is_empty()) {
                return Err(Error::Config(format!("答案「{}」沒有任何標籤", answer)));
            }
        }
        Ok(())
    }

    /// 合併對照表（後加入的優先）
    pub fn merge(&mut self, other: &TagTables) {
        self.basic.extend(other.basic.clone());
        self.fun.extend(other.fun.clone());
    }

    /// 基本題答案的標籤（小寫）。未收錄時退回答案本身
    pub fn basic_tags(&self, answer: &str) -> Vec<String> {
        Self::lookup(&self.basic, answer)
    }

    /// 趣味題答案的標籤（小寫）。未收錄時退回答案本身
    pub fn fun_tags(&self, answer: &str) -> Vec<String> {
        Self::lookup(&self.fun, answer)
    }

    /// 基本題命名空間是否收錄這個答案
    pub fn is_basic_answer(&self, answer: &str) -> bool {
        self.basic.contains_key(answer.trim())
    }

    fn lookup(table: &BTreeMap<String, Vec<String>>, answer: &str) -> Vec<String> {
        let key = answer.trim();
        match table.get(key) {
            Some(tags) => {
                let mut out: Vec<String> = Vec::with_capacity(tags.len());
                for tag in tags {
                    let tag = tag.trim().to_lowercase();
                    if !tag.is_empty() && !out.contains(&tag) {
                        out.push(tag);
                    }
                }
                out
            }
            None if key.is_empty() => Vec::new(),
            None => vec![key.to_lowercase()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_has_both_namespaces() {
        let tables = TagTables::builtin();
        assert!(tables.basic.contains_key("辣"));
        assert!(tables.fun.contains_key("貓派"));
        assert!(!tables.basic.contains_key("貓派"));
    }

    #[test]
    fn test_basic_tags_mapped() {
        let tables = TagTables::builtin();
        let tags = tables.basic_tags("辣");
        assert!(tags.contains(&"麻辣".to_string()));
        assert!(tags.contains(&"川菜".to_string()));
    }

    #[test]
    fn test_literal_fallback() {
        let tables = TagTables::builtin();
        assert_eq!(tables.fun_tags("Ramen"), vec!["ramen".to_string()]);
        assert_eq!(tables.basic_tags("  "), Vec::<String>::new());
    }

    #[test]
    fn test_merge_overrides() {
        let mut tables = TagTables::builtin();
        let custom = TagTables::from_json(r#"{"fun": {"貓派": ["貓咪", "咖啡"]}}"#).unwrap();
        tables.merge(&custom);
        assert_eq!(tables.fun_tags("貓派"), vec!["貓咪".to_string(), "咖啡".to_string()]);
        // 基本題保留
        assert!(tables.basic.contains_key("辣"));
    }

    #[test]
    fn test_from_json_rejects_empty_entry() {
        let result = TagTables::from_json(r#"{"basic": {"喝": []}}"#);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_builtin_ref_is_shared() {
        let a = TagTables::builtin_ref() as *const TagTables;
        let b = TagTables::builtin_ref() as *const TagTables;
        assert_eq!(a, b);
    }
}
