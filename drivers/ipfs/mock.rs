//! In-memory backend speaking both IPFS protocols, for tests

use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use serde_json::json;

use crate::storage::{FilePart, HttpTransport, Result, StorageError};

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: &'static str,
    pub url: String,
    pub fields: Vec<(String, String)>,
}

impl RecordedRequest {
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }
}

#[derive(Default)]
pub struct MockBackend {
    files: Mutex<HashMap<String, Bytes>>,
    /// endpoint suffix -> canned body
    canned: Mutex<HashMap<String, Bytes>>,
    /// endpoint suffixes that fail at the transport level
    failing: Mutex<Vec<String>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond_with(&self, endpoint: &str, body: &str) {
        self.canned.lock().insert(endpoint.to_string(), Bytes::from(body.to_string()));
    }

    pub fn fail_on(&self, endpoint: &str) {
        self.failing.lock().push(endpoint.to_string());
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    fn record(&self, method: &'static str, url: &str, fields: &[(String, String)]) {
        self.requests.lock().push(RecordedRequest {
            method,
            url: url.to_string(),
            fields: fields.to_vec(),
        });
    }

    fn intercept(&self, url: &str) -> Option<Result<Bytes>> {
        let path = url.split('?').next().unwrap_or(url);
        if self.failing.lock().iter().any(|e| path.ends_with(e.as_str())) {
            return Some(Err(StorageError::Transport(format!("connection refused: {}", url))));
        }
        self.canned.lock()
            .iter()
            .find(|(e, _)| path.ends_with(e.as_str()))
            .map(|(_, body)| Ok(body.clone()))
    }

    fn hash(content: &[u8]) -> String {
        format!("Qm{:x}", md5::compute(content))
    }
}

fn field<'a>(fields: &'a [(String, String)], keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .find_map(|key| fields.iter().find(|(k, _)| k == *key))
        .map(|(_, v)| v.as_str())
}

#[async_trait]
impl HttpTransport for MockBackend {
    async fn submit(&self, url: &str, fields: &[(String, String)], file: FilePart) -> Result<Bytes> {
        self.record("MULTIPART", url, fields);
        if let Some(result) = self.intercept(url) {
            return result;
        }

        let name = field(fields, &["key", "filename"]).unwrap_or(file.file_name.as_str()).to_string();
        let body = json!({
            "Name": name,
            "Hash": Self::hash(&file.content),
            "Size": file.content.len(),
        });
        self.files.lock().insert(name, file.content);
        Ok(Bytes::from(body.to_string()))
    }

    async fn post_form(&self, url: &str, fields: &[(String, String)]) -> Result<Bytes> {
        self.record("POST", url, fields);
        if let Some(result) = self.intercept(url) {
            return result;
        }

        let name = field(fields, &["arg", "filename"]).unwrap_or_default().to_string();
        let mut files = self.files.lock();
        let body = if url.ends_with("/flapi/files/stat") {
            match files.get(&name) {
                Some(content) => json!({"Hash": Self::hash(content), "Size": content.len(), "Type": "file"}),
                None => json!({"Message": "file does not exist", "Code": 0, "Type": "error"}),
            }
        } else if url.ends_with("/flapi/files/rm") {
            json!(files.remove(&name).is_some())
        } else if url.ends_with("/api/info") {
            match files.get(&name) {
                Some(content) => json!({"code": 1, "data": {"size": content.len(), "hash": Self::hash(content)}}),
                None => json!({"code": 0, "msg": "file not found"}),
            }
        } else if url.ends_with("/api/del") {
            match files.remove(&name) {
                Some(_) => json!({"code": 1}),
                None => json!({"code": 0, "msg": "file not found"}),
            }
        } else {
            return Err(StorageError::Transport(format!("404 Not Found: {}", url)));
        };

        Ok(Bytes::from(body.to_string()))
    }

    async fn get(&self, url: &str) -> Result<Bytes> {
        self.record("GET", url, &[]);
        if let Some(result) = self.intercept(url) {
            return result;
        }

        let path = url.split('?').next().unwrap_or(url);
        let name = ["/flipfs/", "/file/"]
            .iter()
            .find_map(|marker| path.find(marker).map(|pos| &path[pos + marker.len()..]));

        name.and_then(|name| self.files.lock().get(name).cloned())
            .ok_or_else(|| StorageError::Transport(format!("404 Not Found: {}", url)))
    }
}
