use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use thiserror::Error;

/// Groups of environment variables, loaded per command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    /// `HTTP__*`
    Http,
    /// `PG__*`
    Postgres,
    /// `REDIS__*`; skipped entirely when `REDIS__HOST` is unset.
    Redis,
    /// `CLI__*`
    Cli,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpSettings {
    pub host: String,
    pub port: u16,
    pub worker: usize,
    pub reload: bool,
}

#[derive(Clone, PartialEq, Eq)]
pub struct PostgresSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub db: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub idle_timeout_secs: u64,
}

impl fmt::Debug for PostgresSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("db", &self.db)
            .field("max_connections", &self.max_connections)
            .field("min_connections", &self.min_connections)
            .field("idle_timeout_secs", &self.idle_timeout_secs)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct RedisSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub db: i64,
}

impl fmt::Debug for RedisSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("db", &self.db)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliSettings {
    pub debug: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    /// Directive understood by `tracing_subscriber::EnvFilter`.
    pub fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error | LogLevel::Critical => "error",
        }
    }
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARNING" | "WARN" => Ok(LogLevel::Warning),
            "ERROR" => Ok(LogLevel::Error),
            "CRITICAL" => Ok(LogLevel::Critical),
            other => Err(ConfigError::InvalidValue(
                "LOGGING__LVL".to_string(),
                format!("must be DEBUG, INFO, WARNING, ERROR or CRITICAL, got {}", other),
            )),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub http: Option<HttpSettings>,
    pub postgres: Option<PostgresSettings>,
    pub redis: Option<RedisSettings>,
    pub cli: Option<CliSettings>,
    pub log_level: LogLevel,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
    #[error("Failed to read env file {0}: {1}")]
    EnvFile(String, String),
    #[error("Configuration section {0} was not loaded")]
    SectionNotLoaded(&'static str),
}

impl Config {
    /// Load the requested sections from the process environment, with a
    /// `.env` file in the working directory as a fallback source.
    pub fn from_env(sections: &[Section]) -> Result<Self, ConfigError> {
        let dotenv = Path::new(".env");
        let mut env_map = if dotenv.is_file() {
            read_env_file(dotenv)?
        } else {
            HashMap::new()
        };
        env_map.extend(std::env::vars());
        Self::from_env_map(env_map, sections)
    }

    pub fn from_env_map(
        env_map: HashMap<String, String>,
        sections: &[Section],
    ) -> Result<Self, ConfigError> {
        let log_level = match env_map.get("LOGGING__LVL") {
            Some(raw) => raw.parse::<LogLevel>()?,
            None => LogLevel::default(),
        };

        let mut config = Config {
            log_level,
            ..Config::default()
        };

        for section in sections {
            match section {
                Section::Http => config.http = Some(http_from_map(&env_map)?),
                Section::Postgres => config.postgres = Some(postgres_from_map(&env_map)?),
                Section::Redis => config.redis = redis_from_map(&env_map)?,
                Section::Cli => {
                    config.cli = Some(CliSettings {
                        debug: env_map.get("CLI__DEBUG").cloned(),
                    })
                }
            }
        }

        Ok(config)
    }

    pub fn http(&self) -> Result<&HttpSettings, ConfigError> {
        self.http.as_ref().ok_or(ConfigError::SectionNotLoaded("HTTP"))
    }

    pub fn postgres(&self) -> Result<&PostgresSettings, ConfigError> {
        self.postgres
            .as_ref()
            .ok_or(ConfigError::SectionNotLoaded("PG"))
    }
}

/// Read `KEY=value` pairs from a dotenv file without touching the process
/// environment.
pub fn read_env_file(path: &Path) -> Result<HashMap<String, String>, ConfigError> {
    let env_file_error = |e: dotenvy::Error| {
        ConfigError::EnvFile(path.display().to_string(), e.to_string())
    };

    let mut env_map = HashMap::new();
    for item in dotenvy::from_path_iter(path).map_err(env_file_error)? {
        let (key, value) = item.map_err(env_file_error)?;
        env_map.insert(key, value);
    }
    Ok(env_map)
}

fn required(env_map: &HashMap<String, String>, key: &str) -> Result<String, ConfigError> {
    env_map
        .get(key)
        .cloned()
        .ok_or_else(|| ConfigError::MissingEnv(key.to_string()))
}

fn parsed_or<T: FromStr>(
    env_map: &HashMap<String, String>,
    key: &str,
    default: T,
    expected: &str,
) -> Result<T, ConfigError> {
    match env_map.get(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidValue(key.to_string(), expected.to_string())),
        None => Ok(default),
    }
}

fn bool_or(env_map: &HashMap<String, String>, key: &str, default: bool) -> Result<bool, ConfigError> {
    match env_map.get(key).map(|s| s.trim().to_ascii_lowercase()) {
        None => Ok(default),
        Some(raw) => match raw.as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::InvalidValue(
                key.to_string(),
                "must be a boolean".to_string(),
            )),
        },
    }
}

fn http_from_map(env_map: &HashMap<String, String>) -> Result<HttpSettings, ConfigError> {
    let host = env_map
        .get("HTTP__HOST")
        .cloned()
        .unwrap_or_else(|| "0.0.0.0".to_string());
    let port = parsed_or(env_map, "HTTP__PORT", 8000u16, "must be a valid u16")?;
    let worker = parsed_or(env_map, "HTTP__WORKER", 1usize, "must be a positive integer")?;
    if worker == 0 {
        return Err(ConfigError::InvalidValue(
            "HTTP__WORKER".to_string(),
            "must be at least 1".to_string(),
        ));
    }
    let reload = bool_or(env_map, "HTTP__RELOAD", false)?;

    Ok(HttpSettings {
        host,
        port,
        worker,
        reload,
    })
}

fn postgres_from_map(env_map: &HashMap<String, String>) -> Result<PostgresSettings, ConfigError> {
    Ok(PostgresSettings {
        host: required(env_map, "PG__HOST")?,
        port: parsed_or(env_map, "PG__PORT", 5432u16, "must be a valid u16")?,
        username: required(env_map, "PG__USERNAME")?,
        password: required(env_map, "PG__PASSWORD")?,
        db: required(env_map, "PG__DB")?,
        max_connections: parsed_or(env_map, "PG__MAX_CONNECTIONS", 10u32, "must be a valid u32")?,
        min_connections: parsed_or(env_map, "PG__MIN_CONNECTIONS", 2u32, "must be a valid u32")?,
        idle_timeout_secs: parsed_or(
            env_map,
            "PG__IDLE_TIMEOUT_SECS",
            50u64,
            "must be a valid u64",
        )?,
    })
}

fn redis_from_map(
    env_map: &HashMap<String, String>,
) -> Result<Option<RedisSettings>, ConfigError> {
    let Some(host) = env_map.get("REDIS__HOST").cloned() else {
        return Ok(None);
    };

    Ok(Some(RedisSettings {
        host,
        port: parsed_or(env_map, "REDIS__PORT", 6379u16, "must be a valid u16")?,
        username: env_map.get("REDIS__USERNAME").cloned().unwrap_or_default(),
        password: env_map.get("REDIS__PASSWORD").cloned().unwrap_or_default(),
        db: parsed_or(env_map, "REDIS__DB", 0i64, "must be a valid integer")?,
    }))
}
