//! 餐廳清單讀取
//!
//! - JSON 檔：餐廳陣列、單一餐廳，或 {"restaurants": [...]}
//! - 資料夾：直下的 *.json 依檔名順序串接

use crate::error::{BuddiesError, Result};
use buddies_common::Restaurant;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct Catalog {
    pub restaurants: Vec<Restaurant>,
    /// 讀取的檔案（順序即串接順序）
    pub sources: Vec<PathBuf>,
    /// 所有來源檔內容的 SHA-256
    pub digest: String,
}

impl Catalog {
    pub fn len(&self) -> usize {
        self.restaurants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.restaurants.is_empty()
    }
}

fn is_json_extension(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

/// 資料夾直下的 JSON 檔（檔名順序）
pub fn scan_catalog_dir(folder: &Path) -> Result<Vec<PathBuf>> {
    if !folder.exists() {
        return Err(BuddiesError::CatalogNotFound(folder.display().to_string()));
    }

    let mut files: Vec<PathBuf> = WalkDir::new(folder)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|p| p.is_file() && is_json_extension(p))
        .collect();

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

pub fn load_catalog(path: &Path) -> Result<Catalog> {
    if !path.exists() {
        return Err(BuddiesError::CatalogNotFound(path.display().to_string()));
    }

    let sources = if path.is_dir() {
        scan_catalog_dir(path)?
    } else {
        vec![path.to_path_buf()]
    };

    let mut hasher = Sha256::new();
    let mut restaurants = Vec::new();

    for source in &sources {
        let bytes = std::fs::read(source)?;
        hasher.update(&bytes);
        let parsed = parse_catalog(&bytes)
            .map_err(|e| BuddiesError::InvalidCatalog(format!("{}: {}", source.display(), e)))?;
        debug!(file = %source.display(), count = parsed.len(), "catalog file loaded");
        restaurants.extend(parsed);
    }

    // 沒有 ID 的餐廳依順序編號
    for (i, restaurant) in restaurants.iter_mut().enumerate() {
        if restaurant.id.trim().is_empty() {
            restaurant.id = format!("#{}", i + 1);
        }
    }

    Ok(Catalog {
        restaurants,
        sources,
        digest: hex::encode(hasher.finalize()),
    })
}

/// JSON 位元組 → 餐廳
pub fn parse_catalog(bytes: &[u8]) -> std::result::Result<Vec<Restaurant>, String> {
    let value: Value = serde_json::from_slice(bytes).map_err(|e| e.to_string())?;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut obj) => match obj.remove("restaurants") {
            Some(Value::Array(items)) => items,
            Some(_) => return Err("restaurants 必須是陣列".into()),
            None => vec![Value::Object(obj)],
        },
        _ => return Err("必須是餐廳陣列或物件".into()),
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            if !item.is_object() {
                return Err(format!("第 {} 筆不是物件", i + 1));
            }
            serde_json::from_value(item).map_err(|e| format!("第 {} 筆: {}", i + 1, e))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_json_extension() {
        assert!(is_json_extension(Path::new("a.json")));
        assert!(is_json_extension(Path::new("A.JSON")));
        assert!(!is_json_extension(Path::new("a.txt")));
        assert!(!is_json_extension(Path::new("json")));
    }

    #[test]
    fn test_parse_catalog_array() {
        let restaurants =
            parse_catalog(r#"[{"id": "1", "name": "a"}, {"id": "2", "name": "b"}]"#.as_bytes())
                .unwrap();
        assert_eq!(restaurants.len(), 2);
    }

    #[test]
    fn test_parse_catalog_wrapped_and_single() {
        let wrapped = parse_catalog(r#"{"restaurants": [{"name": "a"}]}"#.as_bytes()).unwrap();
        assert_eq!(wrapped[0].name, "a");

        let single = parse_catalog(r#"{"name": "b", "tags": ["飽足"]}"#.as_bytes()).unwrap();
        assert_eq!(single.len(), 1);
        assert_eq!(single[0].tags, vec!["飽足".to_string()]);
    }

    #[test]
    fn test_parse_catalog_rejects_non_object() {
        assert!(parse_catalog(br#"[{"name": "a"}, 3]"#).unwrap_err().contains("第 2 筆"));
        assert!(parse_catalog(b"42").is_err());
        assert!(parse_catalog(b"{").is_err());
    }
}
