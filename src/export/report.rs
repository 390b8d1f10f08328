//! JSON 推薦報告

use crate::error::Result;
use buddies_common::recommender::ExplainedRestaurant;
use buddies_common::{ScoreBreakdown, ScoredRestaurant};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 推薦模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Individual,
    Group,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportEntry {
    pub rank: usize,
    #[serde(flatten)]
    pub scored: ScoredRestaurant,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<ScoreBreakdown>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationReport {
    pub generated_at: String,
    /// 餐廳清單的 SHA-256（快取鍵）
    pub catalog_digest: String,
    pub mode: Mode,
    pub count: usize,
    pub results: Vec<ReportEntry>,
}

impl RecommendationReport {
    /// `with_breakdown` 為 false 時不附明細
    pub fn new(
        mode: Mode,
        catalog_digest: &str,
        explained: Vec<ExplainedRestaurant>,
        with_breakdown: bool,
    ) -> Self {
        let results: Vec<ReportEntry> = explained
            .into_iter()
            .enumerate()
            .map(|(i, e)| ReportEntry {
                rank: i + 1,
                scored: e.scored,
                breakdown: with_breakdown.then_some(e.breakdown),
            })
            .collect();

        Self {
            generated_at: chrono::Local::now().to_rfc3339(),
            catalog_digest: catalog_digest.to_string(),
            mode,
            count: results.len(),
            results,
        }
    }

    /// 前 N 筆
    pub fn truncate(&mut self, top: usize) {
        self.results.truncate(top);
        self.count = self.results.len();
    }

    pub fn write_json(&self, output_path: &Path) -> Result<()> {
        if let Some(parent) = output_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(output_path, json)?;
        Ok(())
    }
}
