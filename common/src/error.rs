//! 錯誤型別定義
//!
//! 評分本身不會失敗，這裡的錯誤只來自標籤表、題庫與權重設定的載入。

use thiserror::Error;

/// 共用錯誤型別
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),
}

/// Result 型別別名
pub type Result<T> = std::result::Result<T, Error>;
