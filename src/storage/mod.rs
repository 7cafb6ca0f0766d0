use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Stored object metadata / 文件信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileInfo {
    pub name: String,
    pub url: String,
    pub key: String,
    /// Backend metadata (stat object or `data` payload) / 后端返回的元数据
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub meta: serde_json::Value,
}

/// Storage driver interface / 存储驱动接口
///
/// `safe` and `attname` are accepted on the same operations as the hosting
/// framework's storage contract; the remote drivers ignore them.
#[async_trait]
pub trait StorageDriver: Send + Sync {
    /// Driver name / 驱动名称
    fn name(&self) -> &str;

    /// Driver version / 驱动版本
    fn version(&self) -> &str;

    /// Upload file content, returning the decoded backend response / 上传文件内容
    async fn store(
        &self,
        name: &str,
        content: Bytes,
        safe: bool,
        attname: Option<&str>,
    ) -> Result<serde_json::Value>;

    /// Read file content / 读取文件内容
    async fn fetch(&self, name: &str, safe: bool) -> Result<Bytes>;

    /// Delete a stored file / 删除存储的文件
    async fn delete(&self, name: &str, safe: bool) -> Result<bool>;

    /// Check whether a file exists / 检查文件是否存在
    async fn exists(&self, name: &str, safe: bool) -> Result<bool> {
        Ok(self.info(name, safe, None).await?.is_some())
    }

    /// Public URL of a file / 获取文件URL地址
    fn url(&self, name: &str, safe: bool, attname: Option<&str>) -> String;

    /// Storage path of a file, same as the URL for remote drivers / 获取文件存储路径
    fn path(&self, name: &str, safe: bool) -> String {
        self.url(name, safe, None)
    }

    /// File metadata, `None` when the backend does not know the file / 获取文件信息
    async fn info(&self, name: &str, safe: bool, attname: Option<&str>) -> Result<Option<FileInfo>>;

    /// Endpoint accepting uploads / 获取文件上传地址
    fn upload_endpoint(&self) -> String;
}

pub mod context;
pub mod error;
pub mod manager;
pub mod prefix;
pub mod transport;

pub use context::{ConfigSource, DriverContext, RequestContext, StorageConfig};
pub use error::{Result, StorageError};
pub use manager::{DriverBox, DriverFactory, StorageManager};
pub use prefix::ResolvedPrefix;
pub use transport::{FilePart, HttpTransport, ReqwestTransport, TransportOptions};
