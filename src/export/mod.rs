pub mod excel;
pub mod report;

use crate::cli::ExportFormat;
use crate::error::Result;
use std::path::{Path, PathBuf};

pub use report::{Mode, RecommendationReport, ReportEntry};

fn output_path_for_format(output: &Path, title: &str, extension: &str) -> PathBuf {
    if output.is_dir() || output.extension().is_none() {
        output.join(format!("{}.{}", title, extension))
    } else {
        output.to_path_buf()
    }
}

fn output_paths_for_both(output: &Path, title: &str) -> (PathBuf, PathBuf) {
    if output.is_dir() || output.extension().is_none() {
        let json_path = output.join(format!("{}.json", title));
        let excel_path = output.join(format!("{}.xlsx", title));
        (json_path, excel_path)
    } else {
        let parent = output.parent().unwrap_or_else(|| Path::new("."));
        let stem = output
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(title);
        let json_path = parent.join(format!("{}.json", stem));
        let excel_path = parent.join(format!("{}.xlsx", stem));
        (json_path, excel_path)
    }
}

/// 匯出報告，回傳寫出的檔案
pub fn export_report(
    report: &RecommendationReport,
    format: &ExportFormat,
    output: &Path,
    title: &str,
) -> Result<Vec<PathBuf>> {
    let written = match format {
        ExportFormat::Json => {
            let output_path = output_path_for_format(output, title, "json");
            report.write_json(&output_path)?;
            vec![output_path]
        }
        ExportFormat::Excel => {
            let output_path = output_path_for_format(output, title, "xlsx");
            excel::generate_excel(&report.results, &output_path, title)?;
            vec![output_path]
        }
        ExportFormat::Both => {
            let (json_path, excel_path) = output_paths_for_both(output, title);
            report.write_json(&json_path)?;
            excel::generate_excel(&report.results, &excel_path, title)?;
            vec![json_path, excel_path]
        }
    };

    Ok(written)
}
