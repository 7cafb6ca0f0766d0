//! 无签名网关协议 / Unsigned gateway protocol

use bytes::Bytes;
use serde_json::Value;

use crate::storage::{FilePart, ResolvedPrefix};
use super::protocol::{FormRequest, ProtocolAdapter, UploadRequest};
use super::util::is_truthy;

pub const ADD_ENDPOINT: &str = "flapi/add";
pub const RM_ENDPOINT: &str = "flapi/files/rm";
pub const STAT_ENDPOINT: &str = "flapi/files/stat";
pub const OBJECT_PATH: &str = "flipfs";

/// Content hash field present in every successful stat response
const HASH_FIELD: &str = "Hash";

/// Gateway error replies look like `{"Message": .., "Code": .., "Type": "error"}`
fn is_error_reply(response: &Value) -> bool {
    response.get("Type").and_then(Value::as_str) == Some("error")
}

/// IPFS网关协议 / Gateway protocol without request signing
#[derive(Debug, Clone, Default)]
pub struct GatewayProtocol;

impl ProtocolAdapter for GatewayProtocol {
    fn name(&self) -> &'static str {
        "ipfs"
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
            fields: vec![
                ("key".to_string(), name.to_string()),
                ("fileName".to_string(), name.to_string()),
            ],
            file: FilePart {
                field: "file".to_string(),
                file_name: name.to_string(),
                content,
            },
        }
    }

    fn delete_request(&self, prefix: &ResolvedPrefix, name: &str) -> FormRequest {
        FormRequest {
            url: prefix.join(RM_ENDPOINT),
            fields: vec![("arg".to_string(), name.to_string())],
        }
    }

    fn info_request(&self, prefix: &ResolvedPrefix, name: &str) -> FormRequest {
        FormRequest {
            url: prefix.join(STAT_ENDPOINT),
            fields: vec![("arg".to_string(), name.to_string())],
        }
    }

    fn delete_succeeded(&self, response: &Value) -> bool {
        !is_error_reply(response) && is_truthy(response)
    }

    fn info_payload(&self, response: &Value) -> Option<Value> {
        response.get(HASH_FIELD)?;
        Some(response.clone())
    }
}
