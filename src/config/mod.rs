//! Configuration management.
//!
//! Configuration is read from `~/.config/estrazioni/config.toml` (or the
//! `--config` path) at startup. If the file doesn't exist, a default
//! configuration with comments is created. `TELEGRAM_BOT_TOKEN` in the
//! environment takes precedence over `bearer_token`.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::domain::CategorySpec;
use crate::fetcher::http_fetcher::DEFAULT_USER_AGENT;

pub const TOKEN_ENV_VAR: &str = "TELEGRAM_BOT_TOKEN";

const ITALIAN_WEEKDAYS: [(&str, Weekday); 7] = [
    ("lunedi", Weekday::Mon),
    ("martedi", Weekday::Tue),
    ("mercoledi", Weekday::Wed),
    ("giovedi", Weekday::Thu),
    ("venerdi", Weekday::Fri),
    ("sabato", Weekday::Sat),
    ("domenica", Weekday::Sun),
];

/// Main configuration struct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Messaging API credential (Telegram bot token).
    pub bearer_token: String,
    /// Target channel, e.g. `@estrazionilotto` or a numeric id.
    pub channel_id: String,
    /// Daily publish time, `HH:MM` local time.
    pub publish_time: String,
    pub source_url: String,
    /// Label printed under the results.
    pub source_name: String,
    pub max_attempts: u32,
    pub retry_interval_seconds: u64,
    pub fetch_timeout_seconds: u64,
    pub api_base: String,
    /// SQLite file holding the publication marker.
    pub state_path: Option<PathBuf>,
    /// Weekdays with a draw; empty means every day.
    pub draw_days: Vec<String>,
    pub user_agent: String,
    pub categories: Vec<CategorySpec>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bearer_token: String::new(),
            channel_id: "@estrazionilotto".to_string(),
            publish_time: "20:15".to_string(),
            source_url: "https://www.televideo.rai.it/televideo/pub/solotesto.jsp?pagina=589"
                .to_string(),
            source_name: "RAI Televideo".to_string(),
            max_attempts: 10,
            retry_interval_seconds: 300,
            fetch_timeout_seconds: 30,
            api_base: "https://api.telegram.org".to_string(),
            state_path: None,
            draw_days: Vec::new(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            categories: CategorySpec::lotto_wheels(),
        }
    }
}

impl Config {
    /// Load configuration from `path`, or the default path when `None`.
    ///
    /// A missing file is created with commented defaults. Missing fields in
    /// an existing file use default values. The result is validated.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_config_path()?,
        };

        let mut config = if config_path.exists() {
            let content = fs::read_to_string(&config_path).map_err(|e| ConfigError::Io {
                path: config_path.clone(),
                source: e,
            })?;
            toml::from_str(&content).map_err(|e| ConfigError::Parse {
                path: config_path,
                source: e,
            })?
        } else {
            Self::create_default_config(&config_path)?;
            Self::default()
        };

        config.override_token(std::env::var(TOKEN_ENV_VAR).ok());
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path: `~/.config/estrazioni/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("estrazioni").join("config.toml"))
    }

    /// Replace the file token with a non-empty environment value.
    pub fn override_token(&mut self, token: Option<String>) {
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            self.bearer_token = token.trim().to_string();
        }
    }

    /// Check every option except the token, which only some commands need.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.publish_time()?;
        self.draw_weekdays()?;

        for (key, value) in [("source_url", &self.source_url), ("api_base", &self.api_base)] {
            let url = url::Url::parse(value)
                .map_err(|e| ConfigError::Invalid(format!("{} {:?}: {}", key, value, e)))?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(ConfigError::Invalid(format!(
                    "{} must be an http(s) URL, got {:?}",
                    key, value
                )));
            }
        }

        if self.channel_id.trim().is_empty() {
            return Err(ConfigError::Invalid("channel_id cannot be empty".into()));
        }
        if self.max_attempts == 0 {
            return Err(ConfigError::Invalid("max_attempts must be at least 1".into()));
        }
        if self.fetch_timeout_seconds == 0 {
            return Err(ConfigError::Invalid(
                "fetch_timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.categories.is_empty() {
            return Err(ConfigError::Invalid("at least one category is required".into()));
        }
        for category in &self.categories {
            if category.name.trim().is_empty() {
                return Err(ConfigError::Invalid("category name cannot be empty".into()));
            }
            if category.count == 0 {
                return Err(ConfigError::Invalid(format!(
                    "category {} must draw at least one number",
                    category.name
                )));
            }
            if category.min > category.max {
                return Err(ConfigError::Invalid(format!(
                    "category {} has min {} above max {}",
                    category.name, category.min, category.max
                )));
            }
        }

        Ok(())
    }

    pub fn require_token(&self) -> Result<&str, ConfigError> {
        if self.bearer_token.trim().is_empty() {
            return Err(ConfigError::MissingToken);
        }
        Ok(&self.bearer_token)
    }

    pub fn publish_time(&self) -> Result<NaiveTime, ConfigError> {
        NaiveTime::parse_from_str(self.publish_time.trim(), "%H:%M").map_err(|_| {
            ConfigError::Invalid(format!(
                "publish_time must be HH:MM, got {:?}",
                self.publish_time
            ))
        })
    }

    pub fn draw_weekdays(&self) -> Result<Vec<Weekday>, ConfigError> {
        self.draw_days.iter().map(|day| parse_weekday(day)).collect()
    }

    pub fn retry_interval(&self) -> Duration {
        Duration::from_secs(self.retry_interval_seconds)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_seconds)
    }

    /// Configured state file, or `<data_dir>/estrazioni/state.db`.
    pub fn state_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.state_path {
            Some(path) => Ok(path.clone()),
            None => {
                let data_dir = dirs::data_dir().ok_or(ConfigError::NoDataDir)?;
                Ok(data_dir.join("estrazioni").join("state.db"))
            }
        }
    }

    /// Create a default config file with comments.
    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    /// Generate the default config file content with comments.
    fn default_config_content() -> String {
        r##"# Estrazioni configuration

# Telegram bot token. Prefer the TELEGRAM_BOT_TOKEN environment variable.
bearer_token = ""

# Channel receiving the daily results
channel_id = "@estrazionilotto"

# Daily publish time (local, HH:MM)
publish_time = "20:15"

# Results page and the label printed under the results
source_url = "https://www.televideo.rai.it/televideo/pub/solotesto.jsp?pagina=589"
source_name = "RAI Televideo"

# Attempts per daily cycle and the pause between them
max_attempts = 10
retry_interval_seconds = 300

# Per-request timeout for the results page
fetch_timeout_seconds = 30

api_base = "https://api.telegram.org"

# Publication marker file (default: <data dir>/estrazioni/state.db)
# state_path = "/var/lib/estrazioni/state.db"

# Days with a cycle, e.g. ["tue", "thu", "fri", "sat"]. Empty = every day.
draw_days = []

# Wheels to extract, in display order. count/min/max default to 5/1/90.
categories = [
    { name = "BARI" },
    { name = "CAGLIARI" },
    { name = "FIRENZE" },
    { name = "GENOVA" },
    { name = "MILANO" },
    { name = "NAPOLI" },
    { name = "PALERMO" },
    { name = "ROMA" },
    { name = "TORINO" },
    { name = "VENEZIA" },
    { name = "NAZIONALE" },
]
"##
        .to_string()
    }
}

fn parse_weekday(day: &str) -> Result<Weekday, ConfigError> {
    let normalized = day.trim().to_lowercase().replace('ì', "i");

    normalized
        .parse::<Weekday>()
        .ok()
        .or_else(|| {
            ITALIAN_WEEKDAYS
                .iter()
                .find(|(name, _)| *name == normalized)
                .map(|(_, weekday)| *weekday)
        })
        .ok_or_else(|| ConfigError::Invalid(format!("unknown weekday {:?} in draw_days", day)))
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Could not determine data directory")]
    NoDataDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("No bot token: set TELEGRAM_BOT_TOKEN or bearer_token")]
    MissingToken,

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_deserializes() {
        let content = Config::default_config_content();
        let config: Config = toml::from_str(&content).expect("Default config should be valid TOML");
        assert_eq!(config, Config::default());
        config.validate().unwrap();
    }

    #[test]
    fn test_partial_config() {
        let content = r#"
publish_time = "21:00"
max_attempts = 3
categories = [{ name = "A", count = 4 }, { name = "B", count = 4, max = 50 }]
"#;
        let config: Config = toml::from_str(content).expect("Partial config should work");

        assert_eq!(config.publish_time().unwrap(), NaiveTime::from_hms_opt(21, 0, 0).unwrap());
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.categories[1], CategorySpec::new("B", 4, 1, 50));
        // Default value
        assert_eq!(config.retry_interval(), Duration::from_secs(300));
    }

    #[test]
    fn test_load_creates_default_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("estrazioni").join("config.toml");

        let config = Config::load(Some(&path)).unwrap();
        assert!(path.exists());
        assert_eq!(config.channel_id, "@estrazionilotto");
    }

    #[test]
    fn test_load_reports_parse_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "max_attempts = \"many\"").unwrap();

        assert!(matches!(
            Config::load(Some(&path)),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_token_override() {
        let mut config = Config {
            bearer_token: "from-file".into(),
            ..Config::default()
        };
        config.override_token(Some("  ".into()));
        assert_eq!(config.bearer_token, "from-file");
        config.override_token(Some("from-env".into()));
        assert_eq!(config.require_token().unwrap(), "from-env");
    }

    #[test]
    fn test_missing_token() {
        assert!(matches!(
            Config::default().require_token(),
            Err(ConfigError::MissingToken)
        ));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let cases = [
            Config { publish_time: "8pm".into(), ..Config::default() },
            Config { source_url: "ftp://example.com".into(), ..Config::default() },
            Config { max_attempts: 0, ..Config::default() },
            Config { fetch_timeout_seconds: 0, ..Config::default() },
            Config { categories: vec![], ..Config::default() },
            Config { categories: vec![CategorySpec::new("A", 0, 1, 90)], ..Config::default() },
            Config { categories: vec![CategorySpec::new("A", 4, 50, 10)], ..Config::default() },
            Config { draw_days: vec!["someday".into()], ..Config::default() },
        ];

        for config in cases {
            assert!(
                matches!(config.validate(), Err(ConfigError::Invalid(_))),
                "expected {:?} to be rejected",
                config
            );
        }
    }

    #[test]
    fn test_draw_days_accept_english_and_italian() {
        let config = Config {
            draw_days: vec!["tue".into(), "Giovedì".into(), "Friday".into(), "sabato".into()],
            ..Config::default()
        };
        assert_eq!(
            config.draw_weekdays().unwrap(),
            vec![Weekday::Tue, Weekday::Thu, Weekday::Fri, Weekday::Sat]
        );
    }
}
