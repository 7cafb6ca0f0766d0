//! IPFS后端协议抽象 / Backend protocol adapter abstraction

use bytes::Bytes;
use serde_json::Value;

use crate::storage::{FilePart, ResolvedPrefix};

/// 表单请求 / Form-encoded POST
#[derive(Debug, Clone, PartialEq)]
pub struct FormRequest {
    pub url: String,
    pub fields: Vec<(String, String)>,
}

/// 上传请求 / Multipart upload
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub url: String,
    pub fields: Vec<(String, String)>,
    pub file: FilePart,
}

/// Wire encoding of the storage operations for one backend API / 后端协议
///
/// Adapters are pure: they build requests and interpret decoded responses,
/// the driver performs the exchange.
pub trait ProtocolAdapter: Send + Sync + 'static {
    /// Protocol name, used as the driver name / 协议名称
    fn name(&self) -> &'static str;

    /// Path segment under which objects are served / 文件访问路径
    fn object_path(&self) -> &'static str;

    /// Upload endpoint / 上传地址
    fn upload_endpoint(&self, prefix: &ResolvedPrefix) -> String;

    fn upload_request(&self, prefix: &ResolvedPrefix, name: &str, content: Bytes) -> UploadRequest;

    fn delete_request(&self, prefix: &ResolvedPrefix, name: &str) -> FormRequest;

    fn info_request(&self, prefix: &ResolvedPrefix, name: &str) -> FormRequest;

    /// Interpret a decoded delete response / 解析删除结果
    fn delete_succeeded(&self, response: &Value) -> bool;

    /// Metadata from a decoded info response, `None` when the file is unknown / 解析文件信息
    fn info_payload(&self, response: &Value) -> Option<Value>;

    /// Public address of an object / 文件访问地址
    fn object_url(&self, prefix: &ResolvedPrefix, name: &str) -> String {
        prefix.join(&format!("{}/{}", self.object_path(), name.trim_start_matches('/')))
    }
}
