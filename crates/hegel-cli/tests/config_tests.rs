use crate::args::CliArgs;
use crate::config::{CONFIG_FILE, HegelConfig, find_config, load_config, parse_config};
use clap::Parser;
use hegel_core::Environment;
use std::path::{Path, PathBuf};

#[test]
fn test_empty_config_uses_defaults() {
    let config = parse_config("{}").unwrap();
    assert_eq!(config, HegelConfig::default());
    assert_eq!(config.include, ["./**/*.js"]);
    assert_eq!(config.exclude, ["./node_modules/**"]);
    assert_eq!(
        config.typings,
        [
            PathBuf::from("./@types"),
            PathBuf::from("./node_modules/@types")
        ]
    );
    assert!(config.cache_user_modules);
}

#[test]
fn test_camel_case_fields() {
    let config = parse_config(
        r#"{
            "include": ["./src/**/*.js"],
            "environment": ["nodejs"],
            "typings": ["./types"],
            "cacheUserModules": false
        }"#,
    )
    .unwrap();
    assert_eq!(config.include, ["./src/**/*.js"]);
    assert_eq!(config.exclude, ["./node_modules/**"]);
    assert_eq!(config.environment, [Environment::NodeJs]);
    assert_eq!(config.typings, [PathBuf::from("./types")]);
    assert!(!config.cache_user_modules);
}

#[test]
fn test_invalid_json_is_an_error() {
    let error = parse_config("{ \"include\": ").unwrap_err();
    assert!(error.to_string().contains("failed to parse hegel config"));
}

#[test]
fn test_find_config_prefers_explicit_path() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(CONFIG_FILE), r#"{ "environment": ["browser"] }"#).unwrap();
    std::fs::write(dir.path().join("other.json"), r#"{ "environment": ["nodejs"] }"#).unwrap();

    let found = find_config(dir.path(), None).unwrap();
    assert_eq!(found.environment, [Environment::Browser]);
    let explicit = find_config(dir.path(), Some(Path::new("other.json"))).unwrap();
    assert_eq!(explicit.environment, [Environment::NodeJs]);
}

#[test]
fn test_find_config_without_file_is_default() {
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(find_config(dir.path(), None).unwrap(), HegelConfig::default());
}

#[test]
fn test_missing_explicit_config_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let error = load_config(&dir.path().join("missing.json")).unwrap_err();
    assert!(error.to_string().contains("failed to read hegel config"));
}

#[test]
fn test_flags_override_config_and_build_session_config() {
    let mut config = parse_config(r#"{ "environment": ["browser"] }"#).unwrap();
    let args = CliArgs::try_parse_from(["hegel", "--env", "node"]).unwrap();
    config.apply_args(&args);
    assert_eq!(config.environment, [Environment::NodeJs]);

    let session = config.session_config(Path::new("/project"));
    assert_eq!(session.root, PathBuf::from("/project"));
    assert_eq!(session.environments, [Environment::NodeJs]);
    assert_eq!(session.typings, config.typings);
    assert!(session.cache_user_modules);
}
