//! podcast_config - 应用配置
//!
//! 配置以 TOML 保存在用户配置目录下的 `config.toml`，首次运行时写入默认值。

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use podcast_api::ClientConfig;
use podcast_player::EngineConfig;

/// 覆盖接口地址的环境变量
pub const API_URL_ENV: &str = "PODCAST_API_URL";

const CONFIG_FILE: &str = "config.toml";

/// 配置加载/保存错误
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 无法确定用户目录（例如缺少 `$HOME`）
    #[error("failed to obtain user's directories")]
    DirectoriesNotFound,
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to deserialize config: {0}")]
    Deserialize(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// 首页列表配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingConfig {
    /// 一次拉取的节目数
    pub page_size: usize,
    /// 首页“最新”分组的节目数
    pub latest_count: usize,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            page_size: 12,
            latest_count: 2,
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api: ClientConfig,
    pub engine: EngineConfig,
    pub listing: ListingConfig,
}

impl AppConfig {
    /// 应用环境变量覆盖
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(API_URL_ENV).filter(|url| !url.trim().is_empty()) {
            log::info!("API base URL overridden by {}: {}", API_URL_ENV, url);
            self.api.base_url = url.trim().to_string();
        }
    }
}

/// 默认配置文件路径
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    ProjectDirs::from("dev", "podcast", "podcast-player")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
        .ok_or(ConfigError::DirectoriesNotFound)
}

/// 从默认位置加载配置并应用环境变量覆盖
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let path = default_config_path()?;
    let mut config = load_from(&path)?;
    config.apply_overrides(|key| std::env::var(key).ok());
    Ok(config)
}

/// 从指定文件加载配置；文件不存在时写入并返回默认配置
pub fn load_from(path: &Path) -> Result<AppConfig, ConfigError> {
    log::info!("Loading configuration from {path:?}");
    if path.exists() {
        let contents = fs::read_to_string(path)?;
        return Ok(toml::from_str(&contents)?);
    }

    let config = AppConfig::default();
    save_to(&config, path)?;
    Ok(config)
}

/// 覆盖写入配置文件
pub fn save_to(config: &AppConfig, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let contents = toml::to_string_pretty(config)?;
    fs::write(path, contents)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_run_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);

        let config = load_from(&path).unwrap();

        assert_eq!(config, AppConfig::default());
        assert!(path.exists());
        assert_eq!(load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(
            &path,
            "[api]\nbase_url = \"http://podcasts.local\"\n\n[listing]\nlatest_count = 3\n",
        )
        .unwrap();

        let config = load_from(&path).unwrap();

        assert_eq!(config.api.base_url, "http://podcasts.local");
        assert_eq!(config.api.attempts, ClientConfig::default().attempts);
        assert_eq!(config.listing.latest_count, 3);
        assert_eq!(config.listing.page_size, 12);
        assert_eq!(config.engine, EngineConfig::default());
    }

    #[test]
    fn test_save_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        let mut config = AppConfig::default();
        config.engine.volume = 0.5;
        config.listing.page_size = 20;

        save_to(&config, &path).unwrap();

        assert_eq!(load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_toml_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "[api\nbase_url = 1").unwrap();

        assert!(matches!(load_from(&path), Err(ConfigError::Deserialize(_))));
    }

    #[test]
    fn test_env_override() {
        let mut config = AppConfig::default();
        config.apply_overrides(|key| {
            (key == API_URL_ENV).then(|| " http://override:9000 ".to_string())
        });
        assert_eq!(config.api.base_url, "http://override:9000");

        let mut untouched = AppConfig::default();
        untouched.apply_overrides(|_| Some(String::new()));
        assert_eq!(untouched.api.base_url, ClientConfig::default().base_url);
    }
}
