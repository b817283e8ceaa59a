//! Integration tests for configuration loading

use pretty_assertions::assert_eq;
use refindex_core::Config;
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn from_toml_str_parses_full_config() {
    let config = Config::from_toml_str(
        r#"
        [storage]
        provider = "postgres"
        postgres_host = "db.internal"
        postgres_port = 5433
        postgres_database = "refs"
        postgres_user = "svc"
        postgres_password = "secret"
        postgres_pool_size = 32
        "#,
    )
    .expect("config should parse");

    assert_eq!(config.storage.postgres_host, "db.internal");
    assert_eq!(config.storage.postgres_port, 5433);
    assert_eq!(config.storage.postgres_database, "refs");
    assert_eq!(config.storage.postgres_pool_size, 32);
    config.validate().expect("config should validate");
}

#[test]
fn from_toml_str_applies_field_defaults() {
    let config = Config::from_toml_str(
        r#"
        [storage]
        postgres_host = "db.internal"
        "#,
    )
    .expect("config should parse");

    assert_eq!(config.storage.provider, "postgres");
    assert_eq!(config.storage.postgres_port, 5432);
    assert_eq!(config.storage.postgres_database, "refindex");
}

#[test]
fn from_file_reads_toml() {
    let mut file = NamedTempFile::new().expect("temp file");
    writeln!(
        file,
        r#"
        [storage]
        provider = "mock"
        "#
    )
    .expect("write config");

    let config = Config::from_file(file.path()).expect("config should load");
    assert_eq!(config.storage.provider, "mock");
}

#[test]
fn from_file_missing_file_uses_defaults() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config =
        Config::from_file(&dir.path().join("does-not-exist.toml")).expect("config should load");
    assert_eq!(config.storage.provider, "postgres");
}

#[test]
fn save_roundtrips() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("config.toml");

    let mut config = Config::default();
    config.storage.postgres_database = "roundtrip".to_string();
    config.save(&path).expect("save config");

    let loaded = Config::from_file(&path).expect("reload config");
    assert_eq!(loaded.storage.postgres_database, "roundtrip");
}
