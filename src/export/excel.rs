//! Excel 推薦清單

use super::report::ReportEntry;
use crate::error::{BuddiesError, Result};
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, Worksheet};
use std::path::Path;

const HEADERS: &[(&str, f64)] = &[
    ("排名", 6.0),
    ("店名", 28.0),
    ("類型", 16.0),
    ("分數", 10.0),
    ("評分", 8.0),
    ("標籤", 48.0),
];

fn export_err(context: &str) -> impl Fn(rust_xlsxwriter::XlsxError) -> BuddiesError + '_ {
    move |e| BuddiesError::Export(format!("{}: {}", context, e))
}

/// 工作表名稱不可含 []:*?/\ 且最多 31 字
fn sheet_name(title: &str) -> String {
    let name: String = title
        .chars()
        .filter(|c| !matches!(*c, '[' | ']' | ':' | '*' | '?' | '/' | '\\'))
        .take(31)
        .collect();
    if name.trim().is_empty() {
        "推薦結果".to_string()
    } else {
        name
    }
}

fn write_sheet(worksheet: &mut Worksheet, entries: &[ReportEntry], title: &str) -> Result<()> {
    let header_format = Format::new()
        .set_bold()
        .set_font_color(Color::RGB(0x333333))
        .set_background_color(Color::RGB(0xF5F5F5))
        .set_align(FormatAlign::Center)
        .set_border(FormatBorder::Thin)
        .set_border_color(Color::RGB(0xAAAAAA));
    let score_format = Format::new().set_num_format("0.00");

    worksheet.set_name(sheet_name(title)).map_err(export_err("工作表名稱"))?;

    for (col, (label, width)) in HEADERS.iter().enumerate() {
        let col = col as u16;
        worksheet
            .write_string_with_format(0, col, *label, &header_format)
            .map_err(export_err("標題列"))?;
        worksheet.set_column_width(col, *width).map_err(export_err("欄寬"))?;
    }
    worksheet.set_freeze_panes(1, 0).map_err(export_err("凍結窗格"))?;

    for (i, entry) in entries.iter().enumerate() {
        let row = (i + 1) as u32;
        let restaurant = &entry.scored.restaurant;
        worksheet
            .write_number(row, 0, entry.rank as f64)
            .map_err(export_err("排名"))?;
        worksheet
            .write_string(row, 1, restaurant.name.as_str())
            .map_err(export_err("店名"))?;
        worksheet
            .write_string(row, 2, restaurant.category.as_str())
            .map_err(export_err("類型"))?;
        worksheet
            .write_number_with_format(row, 3, entry.scored.match_score, &score_format)
            .map_err(export_err("分數"))?;
        if let Some(rating) = restaurant.rating {
            worksheet.write_number(row, 4, rating).map_err(export_err("評分"))?;
        }
        worksheet
            .write_string(row, 5, restaurant.tags.join("、"))
            .map_err(export_err("標籤"))?;
    }

    Ok(())
}

/// 產生 Excel 到記憶體
pub fn generate_excel_buffer(entries: &[ReportEntry], title: &str) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    write_sheet(workbook.add_worksheet(), entries, title)?;
    workbook.save_to_buffer().map_err(export_err("Excel 產生"))
}

pub fn generate_excel(entries: &[ReportEntry], output_path: &Path, title: &str) -> Result<()> {
    let buffer = generate_excel_buffer(entries, title)?;
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(output_path, buffer)?;
    Ok(())
}
