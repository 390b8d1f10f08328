//! Buddies 餐廳推薦 CLI
//!
//! 推薦引擎本體在 `buddies-common`，這裡負責設定檔、餐廳清單與答案檔的讀取、
//! 互動式問卷以及結果匯出。

pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod input;
pub mod questionnaire;
