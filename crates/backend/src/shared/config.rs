use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub import: ImportSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

/// Минимальная длина секрета JWT в байтах (HS256)
pub const MIN_JWT_SECRET_LEN: usize = 32;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AuthConfig {
    /// Секрет HMAC для проверки bearer-токенов. Значения по умолчанию нет:
    /// без него сервер не стартует.
    #[serde(default)]
    pub jwt_secret: String,
}

impl AuthConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        let secret = self.jwt_secret.trim();
        if secret.is_empty() {
            anyhow::bail!("[auth] jwt_secret is not set");
        }
        if secret.len() < MIN_JWT_SECRET_LEN {
            anyhow::bail!(
                "[auth] jwt_secret is too short: {} bytes, at least {} required",
                secret.len(),
                MIN_JWT_SECRET_LEN
            );
        }
        Ok(())
    }
}

/// Настройки импорта каталога
///
/// Master-место владеет карточками товаров, категориями и поставщиками.
/// Distribution-место получает остатки из файла импорта.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ImportSettings {
    #[serde(default = "default_master_code")]
    pub master_location_code: String,
    #[serde(default = "default_master_name")]
    pub master_location_name: String,
    #[serde(default = "default_distribution_code")]
    pub distribution_location_code: String,
    #[serde(default = "default_distribution_name")]
    pub distribution_location_name: String,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            master_location_code: default_master_code(),
            master_location_name: default_master_name(),
            distribution_location_code: default_distribution_code(),
            distribution_location_name: default_distribution_name(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_port() -> u16 {
    3000
}

fn default_master_code() -> String {
    "MASTER".to_string()
}

fn default_master_name() -> String {
    "Gudang Master".to_string()
}

fn default_distribution_code() -> String {
    "GUDANG-UTAMA".to_string()
}

fn default_distribution_name() -> String {
    "Gudang Utama".to_string()
}

fn default_max_upload_bytes() -> usize {
    20 * 1024 * 1024
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[database]
path = "target/db/pos.db"

[server]
port = 3000

[import]
master_location_code = "MASTER"
distribution_location_code = "GUDANG-UTAMA"
"#;

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Next to the executable (for production)
/// 2. Falls back to embedded default config
///
/// Fails when `[auth] jwt_secret` is missing or too short.
pub fn load_config() -> anyhow::Result<Config> {
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let config_path = exe_dir.join("config.toml");

            if config_path.exists() {
                tracing::info!("Loading config from: {}", config_path.display());
                let contents = std::fs::read_to_string(&config_path)?;
                return parse_config(&contents);
            } else {
                tracing::warn!("config.toml not found at: {}", config_path.display());
            }
        }
    }

    tracing::info!("Using default embedded configuration");
    parse_config(DEFAULT_CONFIG)
}

/// Разобрать и проверить конфигурацию; без секрета JWT запуск невозможен
fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let config: Config = toml::from_str(contents)?;
    config.auth.validate()?;
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_loads() {
        let config: Config = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.database.path, "target/db/pos.db");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.import.master_location_code, "MASTER");
        assert_eq!(config.import.distribution_location_name, "Gudang Utama");
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config: Config = toml::from_str("[database]\npath = \"x.db\"\n").unwrap();
        assert_eq!(config.import, ImportSettings::default());
        assert!(config.auth.jwt_secret.is_empty());
    }

    #[test]
    fn test_startup_refused_without_strong_secret() {
        let embedded = parse_config(DEFAULT_CONFIG).unwrap_err();
        assert!(embedded.to_string().contains("not set"), "{}", embedded);

        let placeholder =
            parse_config("[database]\npath = \"x.db\"\n[auth]\njwt_secret = \"change-me\"\n")
                .unwrap_err();
        assert!(placeholder.to_string().contains("too short"), "{}", placeholder);

        let blank = parse_config("[database]\npath = \"x.db\"\n[auth]\njwt_secret = \"   \"\n");
        assert!(blank.is_err());
    }

    #[test]
    fn test_strong_secret_is_accepted() {
        let config = parse_config(
            "[database]\npath = \"x.db\"\n[auth]\njwt_secret = \"4f9c2e7a1b8d6053e2c4a9f7b1d8e6c3\"\n",
        )
        .unwrap();
        assert_eq!(config.auth.jwt_secret.len(), MIN_JWT_SECRET_LEN);
    }
}
