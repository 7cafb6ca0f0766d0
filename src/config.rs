//! Application configuration module / 应用配置模块
//!
//! Manages application configuration loaded from config.json
//! Creates default config file on first run / 首次运行时创建默认配置文件

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::storage::context::{
    KEY_API_SECRET, KEY_API_USER, KEY_HTTP_DOMAIN, KEY_HTTP_PROTOCOL,
};
use crate::storage::{
    ConfigSource, DriverContext, HttpTransport, RequestContext, ReqwestTransport, StorageConfig,
    TransportOptions,
};

/// Application configuration / 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Driver type to use (`ipfs` or `ipfs_signed`) / 使用的驱动类型
    #[serde(default = "default_driver")]
    pub driver: String,
    /// Storage settings / 存储配置
    #[serde(default)]
    pub storage: StorageSection,
    /// Request context used to resolve the default prefix / 请求上下文
    #[serde(default)]
    pub request: RequestContext,
    /// HTTP client settings / HTTP客户端配置
    #[serde(default)]
    pub http: TransportOptions,
}

/// Storage settings, stored as the raw configuration values / 存储配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageSection {
    #[serde(default)]
    pub ipfs_http_protocol: Option<String>,
    #[serde(default)]
    pub ipfs_http_domain: Option<String>,
    #[serde(default)]
    pub ipfs_api_user: Option<String>,
    #[serde(default)]
    pub ipfs_api_secret: Option<String>,
}

fn default_driver() -> String {
    "ipfs".to_string()
}

impl ConfigSource for AppConfig {
    fn get(&self, key: &str) -> Option<String> {
        match key {
            KEY_HTTP_PROTOCOL => self.storage.ipfs_http_protocol.clone(),
            KEY_HTTP_DOMAIN => self.storage.ipfs_http_domain.clone(),
            KEY_API_USER => self.storage.ipfs_api_user.clone(),
            KEY_API_SECRET => self.storage.ipfs_api_secret.clone(),
            _ => None,
        }
    }
}

impl AppConfig {
    /// Storage configuration read through the key/value contract / 获取存储配置
    pub fn storage_config(&self) -> StorageConfig {
        StorageConfig::from_source(self)
    }

    /// Build the driver context with a reqwest transport / 构建驱动上下文
    pub fn driver_context(&self) -> Result<DriverContext> {
        let transport: Arc<dyn HttpTransport> = Arc::new(
            ReqwestTransport::new(&self.http).context("Failed to create HTTP transport")?,
        );
        Ok(DriverContext::new(self.storage_config(), self.request.clone(), transport))
    }
}

/// Get the default config file path / 获取配置文件路径
pub fn default_config_path() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("config.json")
}

/// Load configuration from file, or create default if not exists / 加载配置文件，不存在则创建默认配置
pub fn load_config(config_path: &Path) -> Result<AppConfig> {
    if config_path.exists() {
        // Load existing config / 加载现有配置
        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file {:?}", config_path))?;

        let config: AppConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {:?}", config_path))?;

        tracing::info!("Loaded configuration from {:?}", config_path);
        Ok(config)
    } else {
        // Create default config / 创建默认配置
        let config = AppConfig {
            driver: default_driver(),
            ..Default::default()
        };
        save_config(&config, config_path)?;
        tracing::info!("Created default configuration at {:?}", config_path);
        Ok(config)
    }
}

/// Save configuration to file / 保存配置到文件
pub fn save_config(config: &AppConfig, config_path: &Path) -> Result<()> {
    let content = serde_json::to_string_pretty(config)
        .context("Failed to serialize config")?;

    std::fs::write(config_path, content)
        .with_context(|| format!("Failed to write config file {:?}", config_path))?;

    Ok(())
}
