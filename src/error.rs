use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuddiesError {
    #[error("設定錯誤: {0}")]
    Config(String),

    #[error("找不到檔案: {0}")]
    FileNotFound(String),

    #[error("找不到餐廳資料: {0}")]
    CatalogNotFound(String),

    #[error("餐廳資料格式錯誤: {0}")]
    InvalidCatalog(String),

    #[error("答案格式錯誤: {0}")]
    InvalidAnswers(String),

    #[error("匯出錯誤: {0}")]
    Export(String),

    #[error("輸入中斷: {0}")]
    Prompt(String),

    #[error("JSON 解析錯誤: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO 錯誤: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] buddies_common::Error),
}

pub type Result<T> = std::result::Result<T, BuddiesError>;
