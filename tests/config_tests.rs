// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use std::path::PathBuf;

use tempfile::TempDir;

use doqq::config::{Settings, ENV_MODEL, ENV_OLLAMA_URL};
use doqq::error::DoqqError;
use doqq::source::{DirectorySource, PayloadSource};

#[test]
fn test_settings_default_values() {
    let settings = Settings::default();

    assert_eq!(settings.ollama.endpoint, "http://localhost:11434/api/chat");
    assert_eq!(settings.ollama.model, "llama3");
    assert_eq!(settings.session.end_signal, "!END!");
    assert!(settings.session.prime_text().contains("!END!"));
}

#[test]
fn test_default_path_follows_doqq_home() {
    let temp_dir = TempDir::new().unwrap();
    std::env::set_var("DOQQ_HOME", temp_dir.path());

    assert_eq!(Settings::doqq_home(), temp_dir.path());
    assert_eq!(
        Settings::default_path(),
        temp_dir.path().join("settings.json")
    );

    let mut settings = Settings::default();
    settings.ollama.model = "qwen2.5-coder".to_string();
    settings.save().unwrap();
    let loaded = Settings::load().unwrap();
    assert_eq!(loaded.ollama.model, "qwen2.5-coder");

    std::env::remove_var("DOQQ_HOME");
}

#[test]
fn test_hand_written_settings_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("settings.json");
    std::fs::write(
        &path,
        r#"{
            "ollama": {"endpoint": "http://gpu-box:11434/api/chat", "request_timeout_secs": 900},
            "session": {"end_signal": "<<END>>", "source_root": "/work/ios-lib"},
            "crawl": {"include": ["*.swift"], "ignore_dirs": ["Pods"]}
        }"#,
    )
    .unwrap();

    let settings = Settings::load_from(&path).unwrap();
    assert!(settings.validate().is_ok());
    assert_eq!(settings.ollama.model, "llama3");
    assert_eq!(settings.ollama.request_timeout_secs, 900);
    assert_eq!(settings.session.source_root, Some(PathBuf::from("/work/ios-lib")));
    assert_eq!(settings.crawl.ignore_dirs, vec!["Pods"]);

    let config = settings.session_config();
    assert_eq!(config.endpoint, "http://gpu-box:11434/api/chat");
    assert_eq!(config.end_signal, "<<END>>");
    assert!(config.prime_instructions.contains("<<END>>"));
}

#[test]
fn test_override_precedence() {
    let mut settings = Settings::default();
    settings.ollama.model = "from-file".to_string();

    settings.apply_env_overrides_from(|key| match key {
        k if k == ENV_MODEL => Some("from-env".to_string()),
        k if k == ENV_OLLAMA_URL => Some("http://env-host:11434/api/chat".to_string()),
        _ => None,
    });
    assert_eq!(settings.ollama.model, "from-env");

    settings.apply_cli_overrides(Some("http://flag-host:11434/api/chat"), None);
    assert_eq!(settings.ollama.model, "from-env");
    assert_eq!(settings.ollama.endpoint, "http://flag-host:11434/api/chat");
}

#[test]
fn test_invalid_settings_are_config_errors() {
    let mut settings = Settings::default();
    settings.ollama.endpoint = "ftp://localhost/api/chat".to_string();
    assert!(matches!(settings.validate(), Err(DoqqError::Config(_))));
}

#[test]
fn test_crawl_settings_drive_directory_source() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::create_dir_all(temp_dir.path().join("Pods/Alamofire")).unwrap();
    std::fs::write(temp_dir.path().join("Pods/Alamofire/AF.swift"), "func af() {}").unwrap();
    std::fs::write(temp_dir.path().join("App.swift"), "func app() {}").unwrap();
    std::fs::write(temp_dir.path().join("notes.md"), "# notes").unwrap();

    let mut settings = Settings::default();
    settings.crawl.ignore_dirs = vec!["Pods".to_string()];
    settings.crawl.include = vec!["*.swift".to_string()];

    let source = DirectorySource::from_config(temp_dir.path(), &settings.crawl).unwrap();
    let names: Vec<_> = source
        .records()
        .map(|r| r.unwrap().relative_path)
        .collect();
    assert_eq!(names, vec!["/App.swift"]);
}
