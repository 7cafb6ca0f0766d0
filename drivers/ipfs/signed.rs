//! 签名认证协议 / Signed authenticated protocol
//!
//! Every request except the public object GET carries `api_user`, `time`,
//! `filename` and `sign = md5(api_user#time#secret)`.

use bytes::Bytes;
use serde_json::Value;

use crate::storage::{FilePart, ResolvedPrefix, StorageConfig};
use super::protocol::{FormRequest, ProtocolAdapter, UploadRequest};
use super::util::{int_field, is_truthy, md5_hex, unix_timestamp};

pub const ADD_ENDPOINT: &str = "api/add";
pub const DEL_ENDPOINT: &str = "api/del";
pub const INFO_ENDPOINT: &str = "api/info";
pub const OBJECT_PATH: &str = "file";

/// Success code of the signed API / 成功状态码
const CODE_OK: i64 = 1;

/// 签名字段 / Signature fields of one outgoing request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    pub api_user: String,
    pub time: i64,
    pub sign: String,
}

impl SignedRequest {
    pub fn new(api_user: &str, secret: &str, time: i64) -> Self {
        Self {
            api_user: api_user.to_string(),
            time,
            sign: calc_sign(api_user, time, secret),
        }
    }

    /// Form fields for a request about `filename` / 生成签名表单
    pub fn fields(&self, filename: &str) -> Vec<(String, String)> {
        vec![
            ("sign".to_string(), self.sign.clone()),
            ("api_user".to_string(), self.api_user.clone()),
            ("time".to_string(), self.time.to_string()),
            ("filename".to_string(), filename.to_string()),
        ]
    }
}

/// 计算签名 / Calculate signature
pub fn calc_sign(api_user: &str, time: i64, secret: &str) -> String {
    md5_hex(&format!("{}#{}#{}", api_user, time, secret))
}

/// 签名协议 / Protocol signing each request with a shared secret
#[derive(Debug, Clone)]
pub struct SignedProtocol {
    api_user: String,
    api_secret: String,
    clock: fn() -> i64,
}

impl SignedProtocol {
    pub fn new(api_user: &str, api_secret: &str) -> Self {
        Self {
            api_user: api_user.to_string(),
            api_secret: api_secret.to_string(),
            clock: unix_timestamp,
        }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(&config.api_user, &config.api_secret)
    }

    /// Replace the timestamp source / 替换时间来源
    pub fn with_clock(mut self, clock: fn() -> i64) -> Self {
        self.clock = clock;
        self
    }

    /// Fresh signature for the current time / 按当前时间签名
    pub fn sign_now(&self) -> SignedRequest {
        SignedRequest::new(&self.api_user, &self.api_secret, (self.clock)())
    }

    fn signed_form(&self, url: String, name: &str) -> FormRequest {
        FormRequest {
            url,
            fields: self.sign_now().fields(name),
        }
    }

    fn is_ok(response: &Value) -> bool {
        int_field(response, "code") == Some(CODE_OK)
    }
}

impl ProtocolAdapter for SignedProtocol {
    fn name(&self) -> &'static str {
        "ipfs_signed"
    }

    fn object_path(&self) -> &'static str {
        OBJECT_PATH
    }

    fn upload_endpoint(&self, prefix: &ResolvedPrefix) -> String {
        prefix.join(ADD_ENDPOINT)
    }

    fn upload_request(&self, prefix: &ResolvedPrefix, name: &str, content: Bytes) -> UploadRequest {
        UploadRequest {
            url: self.upload_endpoint(prefix),
            fields: self.sign_now().fields(name),
            file: FilePart {
                field: "file".to_string(),
                file_name: name.to_string(),
                content,
            },
        }
    }

    fn delete_request(&self, prefix: &ResolvedPrefix, name: &str) -> FormRequest {
        self.signed_form(prefix.join(DEL_ENDPOINT), name)
    }

    fn info_request(&self, prefix: &ResolvedPrefix, name: &str) -> FormRequest {
        self.signed_form(prefix.join(INFO_ENDPOINT), name)
    }

    fn delete_succeeded(&self, response: &Value) -> bool {
        if response.get("code").is_some() {
            Self::is_ok(response)
        } else {
            is_truthy(response)
        }
    }

    fn info_payload(&self, response: &Value) -> Option<Value> {
        if !Self::is_ok(response) {
            return None;
        }
        Some(response.get("data").cloned().unwrap_or(Value::Null))
    }
}
