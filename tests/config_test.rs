//! 設定檔的整合測試

use buddies_common::questions::Q_SPICY;
use buddies_common::GeoPoint;
use buddies_recommend::config::Config;
use buddies_recommend::error::BuddiesError;
use std::fs;
use tempfile::tempdir;

/// 設定檔不存在 → 預設值
#[test]
fn test_missing_config_uses_defaults() {
    let dir = tempdir().expect("Failed to create temp dir");
    let config = Config::load_from(&dir.path().join("config.json")).unwrap();

    assert!(!config.strict_basic_match);
    assert_eq!(config.fallback_limit, 10);
    assert_eq!(config.weights.min_score, 1.0);
    assert!(config.tag_tables.is_none());
}

#[test]
fn test_save_and_load() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("nested").join("config.json");

    let mut config = Config::default();
    config.strict_basic_match = true;
    config.min_score_threshold = Some(4.0);
    config.default_location = Some(GeoPoint::new(25.03, 121.56));
    config.weights.rating = 8.0;
    config.save_to(&path).unwrap();

    let loaded = Config::load_from(&path).unwrap();
    assert!(loaded.strict_basic_match);
    assert_eq!(loaded.min_score_threshold, Some(4.0));
    assert_eq!(loaded.default_location, Some(GeoPoint::new(25.03, 121.56)));
    assert_eq!(loaded.weights.rating, 8.0);
}

/// 只寫部分欄位也能讀取
#[test]
fn test_partial_config() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{"weights": {"basicMatch": 20}, "fallback_limit": 3}"#).unwrap();

    let config = Config::load_from(&path).unwrap();
    assert_eq!(config.weights.basic_match, 20.0);
    assert_eq!(config.weights.fun_match, 5.0);
    assert_eq!(config.fallback_limit, 3);
}

#[test]
fn test_invalid_config_rejected() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("config.json");

    fs::write(&path, r#"{"weights": {"rating": -1}}"#).unwrap();
    assert!(matches!(Config::load_from(&path), Err(BuddiesError::Common(_))));

    fs::write(&path, r#"{"default_location": {"lat": 123.0, "lng": 0.0}}"#).unwrap();
    assert!(matches!(Config::load_from(&path), Err(BuddiesError::Config(_))));

    fs::write(&path, "{ not json").unwrap();
    assert!(matches!(Config::load_from(&path), Err(BuddiesError::Json(_))));
}

/// 追加的對照表蓋過內建的同名答案
#[test]
fn test_tag_tables_merge() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("tags.json");
    fs::write(&path, r#"{"fun": {"貓派": ["貓咪"], "熊派": ["蜂蜜"]}}"#).unwrap();

    let config = Config {
        tag_tables: Some(path),
        ..Default::default()
    };
    let tables = config.load_tag_tables().unwrap();
    assert_eq!(tables.fun["貓派"], vec!["貓咪".to_string()]);
    assert!(tables.fun.contains_key("熊派"));
    assert!(tables.basic.contains_key("辣"));
}

#[test]
fn test_missing_tag_table_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let config = Config {
        tag_tables: Some(dir.path().join("none.json")),
        ..Default::default()
    };
    assert!(matches!(config.load_tag_tables(), Err(BuddiesError::FileNotFound(_))));
}

#[test]
fn test_question_bank_from_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("questions.json");
    fs::write(
        &path,
        format!(r#"[{{"text": "{}", "kind": "basic", "options": ["辣", "不辣"]}}]"#, Q_SPICY),
    )
    .unwrap();

    let config = Config {
        question_bank: Some(path),
        ..Default::default()
    };
    let bank = config.load_question_bank().unwrap();
    assert!(bank.is_basic(Q_SPICY));
    assert_eq!(bank.fun_questions().count(), 0);

    let builtin = Config::default().load_question_bank().unwrap();
    assert_eq!(builtin.basic_questions().count(), 6);
}
