use crate::application::repositories::TitleMatch;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// `WIKI_DATA_DIR` value that selects a private in-memory store
pub const IN_MEMORY: &str = ":memory:";

const DEFAULT_DATA_DIR: &str = "./data";
const DEFAULT_DATABASE: &str = "gowiki";
const DEFAULT_TIMEOUT_MS: u64 = 5_000;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },
}

/// Where the document store lives
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreLocation {
    InMemory,
    /// `<data_dir>/<database>.db`
    File { data_dir: PathBuf, database: String },
}

impl StoreLocation {
    pub fn file(data_dir: impl Into<PathBuf>, database: impl Into<String>) -> Self {
        StoreLocation::File {
            data_dir: data_dir.into(),
            database: database.into(),
        }
    }

    /// Path of the database file, `None` for the in-memory store
    pub fn path(&self) -> Option<PathBuf> {
        match self {
            StoreLocation::InMemory => None,
            StoreLocation::File { data_dir, database } => {
                Some(data_dir.join(format!("{}.db", database)))
            }
        }
    }
}

impl fmt::Display for StoreLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.path() {
            Some(path) => write!(f, "{}", path.display()),
            None => write!(f, "{}", IN_MEMORY),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreConfig {
    pub location: StoreLocation,
    /// Upper bound on how long a single store call waits for the database
    pub timeout: Duration,
    pub title_match: TitleMatch,
}

impl StoreConfig {
    pub fn in_memory() -> Self {
        StoreConfig {
            location: StoreLocation::InMemory,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            title_match: TitleMatch::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WikiConfig {
    pub store: StoreConfig,
}

impl WikiConfig {
    /// Read the configuration from the process environment.
    ///
    /// * `WIKI_DATA_DIR` - directory holding the database file, or `:memory:`
    /// * `WIKI_DATABASE` - database name, the file is `<name>.db`
    /// * `WIKI_STORE_TIMEOUT_MS` - per-call store timeout in milliseconds
    /// * `WIKI_TITLE_MATCH` - `prefix` or `substring`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let data_dir = lookup("WIKI_DATA_DIR").unwrap_or_else(|| DEFAULT_DATA_DIR.to_string());
        let database = lookup("WIKI_DATABASE").unwrap_or_else(|| DEFAULT_DATABASE.to_string());

        let location = if data_dir == IN_MEMORY {
            StoreLocation::InMemory
        } else {
            validate_database_name(&database)?;
            StoreLocation::file(data_dir, database)
        };

        let timeout = match lookup("WIKI_STORE_TIMEOUT_MS") {
            Some(raw) => {
                let millis = raw.trim().parse::<u64>().map_err(|e| ConfigError::InvalidValue {
                    key: "WIKI_STORE_TIMEOUT_MS",
                    reason: e.to_string(),
                })?;
                Duration::from_millis(millis)
            }
            None => Duration::from_millis(DEFAULT_TIMEOUT_MS),
        };

        let title_match = match lookup("WIKI_TITLE_MATCH") {
            Some(raw) => raw.parse::<TitleMatch>().map_err(|e| ConfigError::InvalidValue {
                key: "WIKI_TITLE_MATCH",
                reason: e.to_string(),
            })?,
            None => TitleMatch::default(),
        };

        Ok(WikiConfig {
            store: StoreConfig {
                location,
                timeout,
                title_match,
            },
        })
    }
}

fn validate_database_name(name: &str) -> Result<(), ConfigError> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            key: "WIKI_DATABASE",
            reason: format!("'{}' must be letters, digits, '_' or '-'", name),
        })
    }
}
