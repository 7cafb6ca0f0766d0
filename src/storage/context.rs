//! Driver construction inputs / 驱动构造上下文
//!
//! Everything a driver reads at initialization time is collected here and
//! handed over explicitly, so operations never consult global state.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::transport::HttpTransport;

/// Configuration keys read once at driver initialization / 配置键
pub const KEY_HTTP_PROTOCOL: &str = "storage.ipfs_http_protocol";
pub const KEY_HTTP_DOMAIN: &str = "storage.ipfs_http_domain";
pub const KEY_API_USER: &str = "storage.ipfs_api_user";
pub const KEY_API_SECRET: &str = "storage.ipfs_api_secret";

/// Default protocol when nothing is configured / 默认协议
pub const DEFAULT_HTTP_PROTOCOL: &str = "follow";

/// Key/value configuration source / 配置来源
pub trait ConfigSource {
    fn get(&self, key: &str) -> Option<String>;
}

impl ConfigSource for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

/// Storage configuration, immutable after construction / 存储配置
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// follow | auto | http | https | path
    pub http_protocol: String,
    /// Empty means the ambient request host / 为空时使用当前请求域名
    pub http_domain: String,
    pub api_user: String,
    pub api_secret: String,
}

impl StorageConfig {
    /// Read the storage keys from a configuration source.
    /// Missing values become empty strings; the protocol falls back to `follow`.
    pub fn from_source(source: &dyn ConfigSource) -> Self {
        let read = |key: &str| source.get(key).unwrap_or_default();

        let http_protocol = match read(KEY_HTTP_PROTOCOL) {
            p if p.trim().is_empty() => DEFAULT_HTTP_PROTOCOL.to_string(),
            p => p.trim().to_lowercase(),
        };

        Self {
            http_protocol,
            http_domain: read(KEY_HTTP_DOMAIN).trim().to_string(),
            api_user: read(KEY_API_USER),
            api_secret: read(KEY_API_SECRET),
        }
    }
}

/// Ambient request context / 当前请求上下文
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    /// Current URL scheme, e.g. `https` / 当前协议
    pub scheme: String,
    /// Current host (with port if any) / 当前主机
    pub host: String,
    /// Entry script path, e.g. `/index.php` / 入口文件路径
    pub base_file: String,
}

impl Default for RequestContext {
    fn default() -> Self {
        Self {
            scheme: "http".to_string(),
            host: "localhost".to_string(),
            base_file: "/index.php".to_string(),
        }
    }
}

/// Everything a factory needs to build a driver / 驱动工厂输入
#[derive(Clone)]
pub struct DriverContext {
    pub config: StorageConfig,
    pub request: RequestContext,
    pub transport: Arc<dyn HttpTransport>,
}

impl DriverContext {
    pub fn new(config: StorageConfig, request: RequestContext, transport: Arc<dyn HttpTransport>) -> Self {
        Self { config, request, transport }
    }
}

impl std::fmt::Debug for DriverContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriverContext")
            .field("config", &self.config)
            .field("request", &self.request)
            .finish_non_exhaustive()
    }
}
