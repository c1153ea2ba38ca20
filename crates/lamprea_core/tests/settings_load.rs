use lamprea_core::settings::DEFAULT_EXPORT_DIR;
use lamprea_core::{load_settings, ConfigError, SqliteConnectionProvider};
use std::path::Path;

#[test]
fn settings_file_is_loaded_with_all_tables() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lamprea.toml");
    std::fs::write(
        &path,
        r#"
[db]
url = "sqlite://data/lamprea.sqlite3"
user = "backoffice"
password = "s3cret"

[logging]
level = "warn"

[export]
dir = "out/json"
"#,
    )
    .unwrap();

    let settings = load_settings(&path).unwrap();

    assert_eq!(settings.db.database_path(), "data/lamprea.sqlite3");
    assert_eq!(settings.db.user, "backoffice");
    assert_eq!(settings.db.password, "s3cret");
    assert_eq!(settings.logging.level.as_deref(), Some("warn"));
    assert_eq!(settings.logging.dir, None);
    assert_eq!(settings.export.dir, Path::new("out/json"));
}

#[test]
fn export_dir_defaults_when_table_is_absent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lamprea.toml");
    std::fs::write(
        &path,
        "[db]\nurl = \"a.sqlite3\"\nuser = \"u\"\npassword = \"\"\n",
    )
    .unwrap();

    let settings = load_settings(&path).unwrap();
    assert_eq!(settings.export.dir, Path::new(DEFAULT_EXPORT_DIR));
}

#[test]
fn missing_settings_file_fails_to_load() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_settings(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Load(_)));
}

#[test]
fn missing_credentials_fail_before_any_connection() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lamprea.toml");
    let db_path = dir.path().join("never-created.sqlite3");
    std::fs::write(
        &path,
        format!("[db]\nurl = \"{}\"\n", db_path.display()),
    )
    .unwrap();

    match load_settings(&path).unwrap_err() {
        ConfigError::MissingKeys(keys) => assert_eq!(keys, vec!["db.user", "db.password"]),
        other => panic!("unexpected error: {other}"),
    }

    let err = SqliteConnectionProvider::from_parts(
        Some(db_path.display().to_string()),
        None,
        Some(String::new()),
    )
    .unwrap_err();
    assert!(err.to_string().contains("db.user"));
    assert!(!db_path.exists());
}
