use contracts::domain::a001_productos_vender::excel::DEFAULT_EXCEL_FILE;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Переменная окружения с cron-выражением расписания обновления каталога
pub const CRON_ENV_VAR: &str = "PRODUCTOS_CRON_EXPRESSION";

/// Ежедневно в 3:00
pub const DEFAULT_CRON: &str = "0 3 * * *";

pub const DEFAULT_DEBOUNCE_MS: u64 = 2000;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub import: ImportConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ImportConfig {
    #[serde(default = "default_file")]
    pub file: String,
    #[serde(default = "default_cron")]
    pub cron: String,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            file: default_file(),
            cron: default_cron(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

fn default_file() -> String {
    DEFAULT_EXCEL_FILE.to_string()
}

fn default_cron() -> String {
    DEFAULT_CRON.to_string()
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[database]
path = "target/db/app.db"

[import]
file = "bD_canastasVerdes.xlsx"
cron = "0 3 * * *"
debounce_ms = 2000
"#;

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Next to the executable (for production)
/// 2. Falls back to embedded default config
pub fn load_config() -> anyhow::Result<Config> {
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let config_path = exe_dir.join("config.toml");

            if config_path.exists() {
                tracing::info!("Loading config from: {}", config_path.display());
                let contents = std::fs::read_to_string(&config_path)?;
                let config: Config = toml::from_str(&contents)?;
                return Ok(config);
            } else {
                tracing::warn!("config.toml not found at: {}", config_path.display());
            }
        }
    }

    tracing::info!("Using default embedded configuration");
    let config: Config = toml::from_str(DEFAULT_CONFIG)?;
    Ok(config)
}

/// Get the database file path from configuration
/// Resolves relative paths relative to the executable directory
pub fn get_database_path(config: &Config) -> anyhow::Result<PathBuf> {
    let db_path_str = &config.database.path;
    let db_path = Path::new(db_path_str);

    if db_path.is_absolute() {
        return Ok(db_path.to_path_buf());
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            return Ok(exe_dir.join(db_path));
        }
    }

    Ok(PathBuf::from(db_path_str))
}

/// Путь к Excel-файлу каталога.
/// Относительный путь разрешается от рабочей директории процесса.
pub fn get_excel_path(config: &Config) -> anyhow::Result<PathBuf> {
    let path = Path::new(&config.import.file);
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    Ok(std::env::current_dir()?.join(path))
}

/// Cron-выражение: переменная окружения важнее config.toml
pub fn cron_expression(config: &Config) -> String {
    resolve_cron(std::env::var(CRON_ENV_VAR).ok(), config)
}

fn resolve_cron(from_env: Option<String>, config: &Config) -> String {
    from_env
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| config.import.cron.clone())
}
