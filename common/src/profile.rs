//! 餐廳屬性的正規化
//!
//! 標籤、類型文字與衍生標籤（價位、辣度、人數、硬性類別）整理成
//! 一組小寫 token，評分時只看這組 token。

use crate::tags::{
    DRINK_SYNONYMS, FULL_MEAL_SYNONYMS, LIGHT_MEAL_SYNONYMS, NOT_SPICY_SYNONYMS, SPICY_SYNONYMS,
};
use crate::types::{Restaurant, Spiciness};
use regex::Regex;

/// 飲品店的標準 token
pub const DRINK_TOKEN: &str = "喝";
/// 輕食的標準 token
pub const LIGHT_MEAL_TOKEN: &str = "輕食";
/// 正餐的標準 token
pub const FULL_MEAL_TOKEN: &str = "飽足";

/// 建議人數範圍
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartyRange {
    pub min: u32,
    pub max: u32,
}

impl PartyRange {
    /// 「1~4」「2-6」「4」「2人以上」
    pub fn parse(value: &str) -> Option<Self> {
        lazy_static::lazy_static! {
            static ref RANGE_RE: Regex = Regex::new(r"(\d+)\s*(?:~|～|-|－|到|至)\s*(\d+)").unwrap();
            static ref SINGLE_RE: Regex = Regex::new(r"(\d+)").unwrap();
        }

        if let Some(caps) = RANGE_RE.captures(value) {
            let a: u32 = caps[1].parse().ok()?;
            let b: u32 = caps[2].parse().ok()?;
            return Some(Self { min: a.min(b), max: a.max(b) });
        }

        let caps = SINGLE_RE.captures(value)?;
        let n: u32 = caps[1].parse().ok()?;
        if value.contains("以上") || value.contains('+') {
            Some(Self { min: n, max: u32::MAX })
        } else {
            Some(Self { min: n, max: n })
        }
    }

    /// 一個人可以去
    pub fn fits_solo(&self) -> bool {
        self.min <= 1
    }

    /// 多人可以去
    pub fn fits_group(&self) -> bool {
        self.max >= 2
    }
}

/// 正規化後的餐廳
#[derive(Debug, Clone)]
pub struct RestaurantProfile<'a> {
    pub restaurant: &'a Restaurant,
    tokens: Vec<String>,
    spiciness: Spiciness,
    party: Option<PartyRange>,
}

impl<'a> RestaurantProfile<'a> {
    pub fn build(restaurant: &'a Restaurant) -> Self {
        let mut tokens: Vec<String> = Vec::new();

        for tag in &restaurant.tags {
            push_token(&mut tokens, tag);
        }
        for part in split_category(&restaurant.category) {
            push_token(&mut tokens, part);
        }

        let spiciness = match restaurant.spicy {
            Spiciness::Unknown => spiciness_from_tokens(&tokens),
            known => known,
        };
        let party = restaurant.suggested_people.as_deref().and_then(PartyRange::parse);

        // 衍生 token
        if let Some(tier) = restaurant.price_level {
            push_token(&mut tokens, tier.label());
        }
        for label in spiciness.labels() {
            push_token(&mut tokens, label);
        }
        if let Some(range) = party {
            if range.fits_solo() {
                push_token(&mut tokens, "單人");
            }
            if range.fits_group() {
                push_token(&mut tokens, "多人");
            }
        }
        for (canonical, synonyms) in [
            (DRINK_TOKEN, DRINK_SYNONYMS),
            (LIGHT_MEAL_TOKEN, LIGHT_MEAL_SYNONYMS),
            (FULL_MEAL_TOKEN, FULL_MEAL_SYNONYMS),
        ] {
            if contains_any(&tokens, synonyms) {
                push_token(&mut tokens, canonical);
            }
        }

        Self { restaurant, tokens, spiciness, party }
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn spiciness(&self) -> Spiciness {
        self.spiciness
    }

    pub fn party(&self) -> Option<PartyRange> {
        self.party
    }

    /// 是否有完全一致的 token
    pub fn has_exact(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| t == token)
    }

    /// 標籤比對：完全一致或子字串
    pub fn matches_tag(&self, tag: &str) -> bool {
        !tag.is_empty() && self.tokens.iter().any(|t| t.contains(tag))
    }

    /// 命中的標籤數
    pub fn count_matches(&self, tags: &[String]) -> usize {
        tags.iter().filter(|tag| self.matches_tag(tag)).count()
    }

    /// 任一標籤命中
    pub fn matches_any(&self, tags: &[String]) -> bool {
        tags.iter().any(|tag| self.matches_tag(tag))
    }

    /// 只有飲品、沒有任何餐點類 token
    pub fn is_drink_only(&self) -> bool {
        self.has_exact(DRINK_TOKEN)
            && !self.has_exact(LIGHT_MEAL_TOKEN)
            && !self.has_exact(FULL_MEAL_TOKEN)
    }
}

fn push_token(tokens: &mut Vec<String>, raw: &str) {
    let token = raw.trim().to_lowercase();
    if !token.is_empty() && !tokens.contains(&token) {
        tokens.push(token);
    }
}

fn split_category(category: &str) -> Vec<&str> {
    lazy_static::lazy_static! {
        static ref DELIMITER_RE: Regex = Regex::new(r"[\s,，、/|;；·&+]+").unwrap();
    }
    DELIMITER_RE
        .split(category)
        .filter(|s| !s.is_empty())
        .collect()
}

fn contains_any(tokens: &[String], synonyms: &[&str]) -> bool {
    tokens.iter().any(|t| synonyms.iter().any(|s| t.contains(s)))
}

/// 由標籤推定辣度（含「不辣」的 token 不算辣）
fn spiciness_from_tokens(tokens: &[String]) -> Spiciness {
    let not_spicy = contains_any(tokens, NOT_SPICY_SYNONYMS);
    let spicy = tokens
        .iter()
        .filter(|t| !t.contains("不辣"))
        .any(|t| SPICY_SYNONYMS.iter().any(|s| t.contains(s)));

    match (spicy, not_spicy) {
        (true, true) => Spiciness::Both,
        (true, false) => Spiciness::Spicy,
        (false, true) => Spiciness::NotSpicy,
        (false, false) => Spiciness::Unknown,
    }
}
