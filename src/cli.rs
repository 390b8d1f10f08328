use crate::config::Config;
use crate::error::{BuddiesError, Result};
use crate::input::parse_answer_list;
use buddies_common::questions::DEFAULT_BASIC_COUNT;
use buddies_common::{AnswerAlignment, GeoPoint, RecommendOptions};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "buddies")]
#[command(about = "餐廳推薦：單人滑卡與 Buddies 多人共識推薦", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細日誌
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 依單人答案推薦
    Recommend {
        /// 答案（逗號分隔，空白代表略過）
        #[arg(short, long)]
        answers: Option<String>,

        /// 答案檔（JSON 陣列或一行一個）
        #[arg(long)]
        answers_file: Option<PathBuf>,

        #[command(flatten)]
        common: RecommendArgs,
    },

    /// 依群組答案推薦
    Group {
        /// 成員答案 JSON（成員ID → 答案列表）
        #[arg(short, long, required = true)]
        members: PathBuf,

        #[command(flatten)]
        common: RecommendArgs,
    },

    /// 互動式問卷
    Ask {
        #[command(flatten)]
        common: RecommendArgs,
    },

    /// 顯示標籤對照表
    Tags {
        /// 顯示趣味題的對照表
        #[arg(long)]
        fun: bool,
    },

    /// 顯示/初始化設定
    Config {
        /// 顯示目前設定
        #[arg(long)]
        show: bool,

        /// 以預設值建立設定檔
        #[arg(long)]
        init: bool,
    },
}

/// 推薦類指令共用的參數
#[derive(Args, Clone, Debug, Default)]
pub struct RecommendArgs {
    /// 餐廳 JSON 檔或資料夾
    #[arg(short, long, required = true)]
    pub catalog: PathBuf,

    /// 與答案平行的題目文字（逗號分隔）
    #[arg(long)]
    pub questions: Option<String>,

    /// 位置對齊時的基本題數
    #[arg(long)]
    pub basic_count: Option<usize>,

    /// 使用者緯度
    #[arg(long, allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// 使用者經度
    #[arg(long, allow_negative_numbers = true)]
    pub lng: Option<f64>,

    /// 嚴格模式：基本題不符即淘汰，不退回
    #[arg(long)]
    pub strict: bool,

    /// 分數門檻
    #[arg(long)]
    pub threshold: Option<f64>,

    /// 顯示筆數
    #[arg(short = 'n', long, default_value = "10")]
    pub top: usize,

    /// 顯示分數明細
    #[arg(long)]
    pub explain: bool,

    /// 匯出形式 (json/excel/both)
    #[arg(short, long)]
    pub format: Option<ExportFormat>,

    /// 匯出檔案/資料夾
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl RecommendArgs {
    pub fn alignment(&self) -> AnswerAlignment {
        match &self.questions {
            Some(texts) => AnswerAlignment::QuestionTexts {
                texts: parse_answer_list(texts),
            },
            None => AnswerAlignment::Positional {
                basic_count: self.basic_count.unwrap_or(DEFAULT_BASIC_COUNT),
            },
        }
    }

    pub fn user_location(&self, config: &Config) -> Result<Option<GeoPoint>> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => {
                let point = GeoPoint::new(lat, lng);
                if !point.is_valid() {
                    return Err(BuddiesError::Config(format!("位置超出範圍: {}, {}", lat, lng)));
                }
                Ok(Some(point))
            }
            (None, None) => Ok(config.default_location),
            _ => Err(BuddiesError::Config("--lat 與 --lng 必須同時指定".into())),
        }
    }

    /// 命令列參數優先，其次是設定檔
    pub fn to_options(&self, config: &Config) -> Result<RecommendOptions> {
        Ok(RecommendOptions {
            alignment: self.alignment(),
            user_location: self.user_location(config)?,
            strict_basic_match: self.strict || config.strict_basic_match,
            min_score_threshold: self.threshold.or(config.min_score_threshold),
            fallback_limit: config.fallback_limit,
            ..Default::default()
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ExportFormat {
    #[default]
    Json,
    Excel,
    Both,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "excel" | "xlsx" => Ok(ExportFormat::Excel),
            "both" => Ok(ExportFormat::Both),
            _ => Err(format!("Unknown format: {}. Use json, excel, or both", s)),
        }
    }
}
