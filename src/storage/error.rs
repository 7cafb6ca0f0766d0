//! Storage error types / 存储错误类型

use thiserror::Error;

/// Errors surfaced by storage drivers / 存储驱动错误
#[derive(Debug, Error)]
pub enum StorageError {
    /// Driver selection or configuration cannot be resolved / 配置错误
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Backend answered with something other than the expected structure / 协议错误
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The HTTP exchange itself failed / 传输错误
    #[error("Transport error: {0}")]
    Transport(String),
}

impl StorageError {
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    pub fn is_protocol(&self) -> bool {
        matches!(self, Self::Protocol(_))
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

impl From<reqwest::Error> for StorageError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::Protocol(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StorageError>;
