//! HTTP transport used by remote drivers / HTTP传输层

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::error::{Result, StorageError};

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// One file part of a multipart submission / 上传文件字段
#[derive(Debug, Clone)]
pub struct FilePart {
    /// Form field name / 字段名
    pub field: String,
    /// File name sent with the part / 文件名
    pub file_name: String,
    pub content: Bytes,
}

/// Transport capability the drivers depend on / 传输层接口
///
/// Each call is one request/response exchange and returns the raw body.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Multipart POST with one file and auxiliary text fields / 表单上传
    ///
    /// API replies are returned for any HTTP status.
    async fn submit(&self, url: &str, fields: &[(String, String)], file: FilePart) -> Result<Bytes>;

    /// Form-encoded POST / 表单POST
    async fn post_form(&self, url: &str, fields: &[(String, String)]) -> Result<Bytes>;

    /// Plain GET, non-2xx replies are transport errors / GET请求
    async fn get(&self, url: &str) -> Result<Bytes>;
}

/// Client options / 客户端选项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportOptions {
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            connect_timeout_secs: 10,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// reqwest backed transport / 基于reqwest的传输实现
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(options: &TransportOptions) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(options.timeout_secs))
            .connect_timeout(Duration::from_secs(options.connect_timeout_secs))
            .user_agent(&options.user_agent)
            .build()
            .map_err(|e| StorageError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Scheme-relative URLs (`//host/...`) cannot be requested directly
    fn absolute(url: &str) -> String {
        if url.starts_with("//") {
            format!("http:{}", url)
        } else {
            url.to_string()
        }
    }

    /// Body of an API reply whatever its status; the caller decodes it
    async fn read_reply(resp: reqwest::Response) -> Result<Bytes> {
        let status = resp.status();
        if !status.is_success() {
            tracing::debug!("{} answered {}", resp.url(), status);
        }
        Ok(resp.bytes().await?)
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn submit(&self, url: &str, fields: &[(String, String)], file: FilePart) -> Result<Bytes> {
        let mut form = Form::new();
        for (key, value) in fields {
            form = form.text(key.clone(), value.clone());
        }
        let part = Part::bytes(file.content.to_vec()).file_name(file.file_name);
        form = form.part(file.field, part);

        let resp = self.client
            .post(Self::absolute(url))
            .multipart(form)
            .send()
            .await?;

        Self::read_reply(resp).await
    }

    async fn post_form(&self, url: &str, fields: &[(String, String)]) -> Result<Bytes> {
        let resp = self.client
            .post(Self::absolute(url))
            .form(fields)
            .send()
            .await?;

        Self::read_reply(resp).await
    }

    async fn get(&self, url: &str) -> Result<Bytes> {
        let resp = self.client
            .get(Self::absolute(url))
            .send()
            .await?
            .error_for_status()?;

        Ok(resp.bytes().await?)
    }
}
