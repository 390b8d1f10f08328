use crate::error::{BuddiesError, Result};
use buddies_common::recommender::DEFAULT_FALLBACK_LIMIT;
use buddies_common::{GeoPoint, QuestionBank, ScoringWeights, TagTables};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub weights: ScoringWeights,
    /// 追加的標籤對照表（蓋過內建表）
    pub tag_tables: Option<PathBuf>,
    /// 自訂題庫
    pub question_bank: Option<PathBuf>,
    pub strict_basic_match: bool,
    pub min_score_threshold: Option<f64>,
    pub fallback_limit: usize,
    pub default_location: Option<GeoPoint>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// 設定檔不存在時使用預設值
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Self::default_config())
        }
    }

    pub fn save(&self) -> Result<PathBuf> {
        let config_path = Self::config_path()?;
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| BuddiesError::Config("找不到家目錄".into()))?;
        Ok(home.join(".config").join("buddies").join("config.json"))
    }

    fn default_config() -> Self {
        Self {
            weights: ScoringWeights::default(),
            tag_tables: None,
            question_bank: None,
            strict_basic_match: false,
            min_score_threshold: None,
            fallback_limit: DEFAULT_FALLBACK_LIMIT,
            default_location: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.weights.validate()?;
        if let Some(threshold) = self.min_score_threshold {
            if !threshold.is_finite() {
                return Err(BuddiesError::Config(format!("門檻必須是數字: {}", threshold)));
            }
        }
        if let Some(location) = self.default_location {
            if !location.is_valid() {
                return Err(BuddiesError::Config(format!(
                    "預設位置超出範圍: {}, {}",
                    location.lat, location.lng
                )));
            }
        }
        Ok(())
    }

    /// 內建標籤表，再合併設定檔指定的表
    pub fn load_tag_tables(&self) -> Result<TagTables> {
        let mut tables = TagTables::builtin();
        if let Some(path) = &self.tag_tables {
            if !path.exists() {
                return Err(BuddiesError::FileNotFound(path.display().to_string()));
            }
            tables.merge(&TagTables::from_file(path)?);
        }
        Ok(tables)
    }

    pub fn load_question_bank(&self) -> Result<QuestionBank> {
        match &self.question_bank {
            Some(path) if !path.exists() => {
                Err(BuddiesError::FileNotFound(path.display().to_string()))
            }
            Some(path) => Ok(QuestionBank::from_file(path)?),
            None => Ok(QuestionBank::builtin()),
        }
    }
}
