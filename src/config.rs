use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::sync::search_expression;

pub const SHEET_ID_ENV: &str = "JOB_APPS_SHEET_ID";

const DEFAULT_QUERY: &str = r#"
(subject:("application received" OR "application confirmation" OR "thank you for applying" OR "thanks for applying")
 OR "We received your application")
"#;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sheet_id: Option<String>,
    pub sheet_range: String,
    pub search: SearchConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub window_days: u32,
    /// Provider search syntax. Newlines and indentation are collapsed.
    pub query: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub client_secret: PathBuf,
    pub token_dir: PathBuf,
    pub token_store: TokenStore,
    pub redirect_port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TokenStore {
    #[default]
    File,
    Keyring,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sheet_id: None,
            sheet_range: "Sheet1!A:G".to_string(),
            search: SearchConfig::default(),
            auth: AuthConfig::default(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            window_days: 90,
            query: DEFAULT_QUERY.to_string(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            client_secret: PathBuf::from("credentials.json"),
            token_dir: PathBuf::from("."),
            token_store: TokenStore::File,
            redirect_port: 8080,
        }
    }
}

impl Config {
    /// Reads `path` (defaults when absent) and applies the environment
    /// override for the sheet id.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load_file(path)?;
        if let Ok(sheet_id) = std::env::var(SHEET_ID_ENV) {
            config.sheet_id = Some(sheet_id);
        }
        Ok(config)
    }

    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_toml(&content)
                .map_err(|e| Error::Config(format!("{}: {}", path.display(), e))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(Error::Config(format!("{}: {}", path.display(), e))),
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn require_sheet_id(&self) -> Result<&str> {
        match self.sheet_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => Ok(id),
            _ => Err(Error::Config(format!(
                "Set {} environment variable to your Google Sheet ID.",
                SHEET_ID_ENV
            ))),
        }
    }

    pub fn search_expression(&self) -> String {
        search_expression(self.search.window_days, &self.search.query)
    }
}

impl AuthConfig {
    /// One persisted credential file per API.
    pub fn token_path(&self, api: &str) -> PathBuf {
        self.token_dir.join(format!("token_{}.json", api))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_confirmation_search() {
        let config = Config::default();
        assert_eq!(config.sheet_range, "Sheet1!A:G");
        assert_eq!(config.auth.token_store, TokenStore::File);
        assert_eq!(
            config.search_expression(),
            "newer_than:90d (subject:(\"application received\" OR \"application confirmation\" OR \"thank you for applying\" OR \"thanks for applying\") OR \"We received your application\")"
        );
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = Config::from_toml(
            r#"
            sheet_id = "1AbC"

            [search]
            window_days = 30

            [auth]
            token_store = "keyring"
            token_dir = "/tmp/tokens"
            "#,
        )
        .unwrap();
        assert_eq!(config.require_sheet_id().unwrap(), "1AbC");
        assert_eq!(config.search.window_days, 30);
        assert!(config.search.query.contains("thanks for applying"));
        assert_eq!(config.auth.token_store, TokenStore::Keyring);
        assert_eq!(config.auth.redirect_port, 8080);
        assert_eq!(
            config.auth.token_path("sheets"),
            PathBuf::from("/tmp/tokens/token_sheets.json")
        );
    }

    #[test]
    fn missing_sheet_id_is_a_config_error() {
        let mut config = Config::default();
        assert!(matches!(config.require_sheet_id(), Err(Error::Config(_))));
        config.sheet_id = Some("   ".to_string());
        assert!(matches!(config.require_sheet_id(), Err(Error::Config(_))));
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_file(dir.path().join("settings.toml")).unwrap();
        assert!(config.sheet_id.is_none());
    }

    #[test]
    fn malformed_file_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "sheet_id = [").unwrap();
        assert!(matches!(Config::load_file(file.path()), Err(Error::Config(_))));
    }
}
