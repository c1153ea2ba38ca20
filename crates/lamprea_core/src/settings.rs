//! Process settings: store credentials, logging and export locations.
//!
//! # Responsibility
//! - Load settings once at start-up from a TOML file plus environment overrides.
//! - Fail fast, naming every missing key, before any connection is attempted.
//!
//! # Invariants
//! - A constructed [`DbConfig`] always has a non-blank `url` and `user`.
//! - Passwords never appear in `Debug` output.

use serde::Deserialize;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::path::{Path, PathBuf};

/// Settings file used when the caller does not pick one.
pub const DEFAULT_SETTINGS_PATH: &str = "config/lamprea.toml";
/// Prefix for environment overrides (`LAMPREA__DB__URL`, ...).
pub const ENV_PREFIX: &str = "LAMPREA";
/// Export directory used when `[export] dir` is not set.
pub const DEFAULT_EXPORT_DIR: &str = "exports";

const KEY_DB_URL: &str = "db.url";
const KEY_DB_USER: &str = "db.user";
const KEY_DB_PASSWORD: &str = "db.password";

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Settings loading/validation failure.
#[derive(Debug)]
pub enum ConfigError {
    /// Settings source could not be read or parsed.
    Load(config::ConfigError),
    /// Required keys are absent or blank.
    MissingKeys(Vec<&'static str>),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Load(err) => write!(f, "failed to load settings: {err}"),
            Self::MissingKeys(keys) => {
                write!(f, "missing required settings keys: {}", keys.join(", "))
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Load(err) => Some(err),
            Self::MissingKeys(_) => None,
        }
    }
}

impl From<config::ConfigError> for ConfigError {
    fn from(value: config::ConfigError) -> Self {
        Self::Load(value)
    }
}

/// Store connection parameters.
///
/// `url` is a SQLite database path or `file:` URI; an optional `sqlite:` or
/// `sqlite://` scheme prefix is accepted. SQLite does not authenticate, so
/// `user` is only used to attribute log events and `password` is carried for
/// completeness of the connection key set.
#[derive(Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub url: String,
    pub user: String,
    pub password: String,
}

impl DbConfig {
    /// Builds a config from already-known values.
    ///
    /// # Errors
    /// - [`ConfigError::MissingKeys`] when `url` or `user` is blank.
    pub fn new(
        url: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> ConfigResult<Self> {
        Self::from_parts(Some(url.into()), Some(user.into()), Some(password.into()))
    }

    /// Builds a config from optional values, reporting every missing key at once.
    pub fn from_parts(
        url: Option<String>,
        user: Option<String>,
        password: Option<String>,
    ) -> ConfigResult<Self> {
        let url = url.filter(|value| !value.trim().is_empty());
        let user = user.filter(|value| !value.trim().is_empty());

        let mut missing = Vec::new();
        if url.is_none() {
            missing.push(KEY_DB_URL);
        }
        if user.is_none() {
            missing.push(KEY_DB_USER);
        }
        if password.is_none() {
            missing.push(KEY_DB_PASSWORD);
        }

        match (url, user, password) {
            (Some(url), Some(user), Some(password)) => Ok(Self {
                url: url.trim().to_string(),
                user: user.trim().to_string(),
                password,
            }),
            _ => Err(ConfigError::MissingKeys(missing)),
        }
    }

    /// Returns the file-system path (or URI) SQLite should open.
    pub fn database_path(&self) -> &str {
        self.url
            .strip_prefix("sqlite://")
            .or_else(|| self.url.strip_prefix("sqlite:"))
            .unwrap_or(&self.url)
    }
}

impl Debug for DbConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbConfig")
            .field("url", &self.url)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// `[logging]` table. Logging stays disabled when `dir` is unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LoggingSettings {
    pub level: Option<String>,
    pub dir: Option<PathBuf>,
}

/// `[export]` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExportSettings {
    #[serde(default = "default_export_dir")]
    pub dir: PathBuf,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            dir: default_export_dir(),
        }
    }
}

/// Fully validated process settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub db: DbConfig,
    pub logging: LoggingSettings,
    pub export: ExportSettings,
}

#[derive(Debug, Default, Deserialize)]
struct RawSettings {
    #[serde(default)]
    db: RawDbSettings,
    #[serde(default)]
    logging: LoggingSettings,
    #[serde(default)]
    export: ExportSettings,
}

#[derive(Debug, Default, Deserialize)]
struct RawDbSettings {
    url: Option<String>,
    user: Option<String>,
    password: Option<String>,
}

/// Loads settings from a TOML file, then applies `LAMPREA__*` environment overrides.
///
/// # Errors
/// - [`ConfigError::Load`] when the file is missing or malformed.
/// - [`ConfigError::MissingKeys`] when `db.url`, `db.user` or `db.password` is absent.
pub fn load_settings(path: impl AsRef<Path>) -> ConfigResult<Settings> {
    let source = config::File::from(path.as_ref()).format(config::FileFormat::Toml);
    let raw = config::Config::builder()
        .add_source(source)
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?
        .try_deserialize::<RawSettings>()?;
    Settings::from_raw(raw)
}

/// Parses settings from TOML text without consulting the environment.
pub fn parse_settings(toml: &str) -> ConfigResult<Settings> {
    let raw = config::Config::builder()
        .add_source(config::File::from_str(toml, config::FileFormat::Toml))
        .build()?
        .try_deserialize::<RawSettings>()?;
    Settings::from_raw(raw)
}

impl Settings {
    fn from_raw(raw: RawSettings) -> ConfigResult<Self> {
        let db = DbConfig::from_parts(raw.db.url, raw.db.user, raw.db.password)?;
        Ok(Self {
            db,
            logging: raw.logging,
            export: raw.export,
        })
    }
}

fn default_export_dir() -> PathBuf {
    PathBuf::from(DEFAULT_EXPORT_DIR)
}

#[cfg(test)]
mod tests {
    use super::{parse_settings, ConfigError, DbConfig};
    use std::path::PathBuf;

    #[test]
    fn parse_reads_all_tables() {
        let settings = parse_settings(
            r#"
            [db]
            url = "sqlite://shop.sqlite3"
            user = "staff"
            password = "secret"

            [logging]
            level = "debug"
            dir = "/tmp/lamprea-logs"

            [export]
            dir = "out"
            "#,
        )
        .unwrap();

        assert_eq!(settings.db.database_path(), "shop.sqlite3");
        assert_eq!(settings.db.user, "staff");
        assert_eq!(settings.logging.level.as_deref(), Some("debug"));
        assert_eq!(settings.export.dir, PathBuf::from("out"));
    }

    #[test]
    fn optional_tables_fall_back_to_defaults() {
        let settings = parse_settings(
            r#"
            [db]
            url = "shop.sqlite3"
            user = "staff"
            password = ""
            "#,
        )
        .unwrap();

        assert_eq!(settings.export.dir, PathBuf::from("exports"));
        assert!(settings.logging.dir.is_none());
        assert_eq!(settings.db.password, "");
    }

    #[test]
    fn missing_keys_are_reported_together() {
        let err = parse_settings("[db]\nurl = \"shop.sqlite3\"\n").unwrap_err();
        match err {
            ConfigError::MissingKeys(keys) => assert_eq!(keys, vec!["db.user", "db.password"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn blank_url_counts_as_missing() {
        let err = DbConfig::new("   ", "staff", "pw").unwrap_err();
        assert!(matches!(err, ConfigError::MissingKeys(keys) if keys == vec!["db.url"]));
    }

    #[test]
    fn debug_output_redacts_password() {
        let config = DbConfig::new("shop.sqlite3", "staff", "hunter2").unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));
    }
}
