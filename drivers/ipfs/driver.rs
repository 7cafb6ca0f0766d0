//! IPFS驱动核心实现 / IPFS driver core

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;

use crate::storage::{
    FileInfo, HttpTransport, RequestContext, ResolvedPrefix, Result, StorageConfig, StorageDriver,
    StorageError,
};
use super::protocol::{FormRequest, ProtocolAdapter};
use super::util::unix_timestamp;

/// IPFS存储驱动 / IPFS storage driver bound to one backend protocol
pub struct IpfsDriver<P: ProtocolAdapter> {
    prefix: ResolvedPrefix,
    protocol: P,
    transport: Arc<dyn HttpTransport>,
}

impl<P: ProtocolAdapter> IpfsDriver<P> {
    pub fn new(
        protocol: P,
        config: &StorageConfig,
        request: &RequestContext,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        let prefix = ResolvedPrefix::resolve(config, request);
        tracing::debug!("{} driver prefix resolved: {:?}", protocol.name(), prefix.as_str());
        Self { prefix, protocol, transport }
    }

    /// POST a form and decode the JSON answer / 发送表单并解析JSON
    async fn post_json(&self, request: FormRequest) -> Result<Value> {
        tracing::debug!("POST {}", request.url);
        let body = self.transport.post_form(&request.url, &request.fields).await?;
        decode(&request.url, &body)
    }
}

fn decode(url: &str, body: &[u8]) -> Result<Value> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::warn!("Malformed response from {}: {}", url, e);
        StorageError::Protocol(format!("Invalid JSON response from {}: {}", url, e))
    })
}

#[async_trait]
impl<P: ProtocolAdapter> StorageDriver for IpfsDriver<P> {
    fn name(&self) -> &str {
        self.protocol.name()
    }

    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    async fn store(
        &self,
        name: &str,
        content: Bytes,
        _safe: bool,
        _attname: Option<&str>,
    ) -> Result<Value> {
        let request = self.protocol.upload_request(&self.prefix, name, content);
        tracing::debug!("Upload {} ({} bytes) to {}", name, request.file.content.len(), request.url);

        let body = self.transport.submit(&request.url, &request.fields, request.file).await?;
        decode(&request.url, &body)
    }

    async fn fetch(&self, name: &str, safe: bool) -> Result<Bytes> {
        // `e` defeats intermediate caches
        let url = format!("{}?e={}", self.url(name, safe, None), unix_timestamp());
        tracing::debug!("GET {}", url);
        self.transport.get(&url).await
    }

    async fn delete(&self, name: &str, _safe: bool) -> Result<bool> {
        let request = self.protocol.delete_request(&self.prefix, name);
        let response = self.post_json(request).await?;
        Ok(self.protocol.delete_succeeded(&response))
    }

    fn url(&self, name: &str, _safe: bool, _attname: Option<&str>) -> String {
        self.protocol.object_url(&self.prefix, name)
    }

    async fn info(&self, name: &str, safe: bool, attname: Option<&str>) -> Result<Option<FileInfo>> {
        let request = self.protocol.info_request(&self.prefix, name);
        let response = match self.post_json(request).await {
            Ok(response) => response,
            // A malformed answer means the backend has nothing for us
            Err(StorageError::Protocol(_)) => return Ok(None),
            Err(e) => return Err(e),
        };

        Ok(self.protocol.info_payload(&response).map(|meta| FileInfo {
            name: name.to_string(),
            url: self.url(name, safe, attname),
            key: name.to_string(),
            meta,
        }))
    }

    fn upload_endpoint(&self) -> String {
        self.protocol.upload_endpoint(&self.prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::ipfs::mock::MockBackend;
    use crate::drivers::ipfs::{GatewayProtocol, SignedProtocol};
    use crate::drivers::ipfs::signed::calc_sign;

    fn config(protocol: &str) -> StorageConfig {
        StorageConfig {
            http_protocol: protocol.to_string(),
            http_domain: "ipfs.example.com".to_string(),
            api_user: "u1".to_string(),
            api_secret: "s1".to_string(),
        }
    }

    fn gateway(backend: &Arc<MockBackend>) -> IpfsDriver<GatewayProtocol> {
        IpfsDriver::new(GatewayProtocol, &config("https"), &RequestContext::default(), backend.clone())
    }

    fn signed(backend: &Arc<MockBackend>) -> IpfsDriver<SignedProtocol> {
        let protocol = SignedProtocol::from_config(&config("https"));
        IpfsDriver::new(protocol, &config("https"), &RequestContext::default(), backend.clone())
    }

    #[test]
    fn test_url_and_path() {
        let backend = Arc::new(MockBackend::new());
        let driver = gateway(&backend);
        assert_eq!(driver.url("a/b.png", false, None), "https://ipfs.example.com/flipfs/a/b.png");
        assert_eq!(driver.path("/a/b.png", true), "https://ipfs.example.com/flipfs/a/b.png");
        assert_eq!(driver.upload_endpoint(), "https://ipfs.example.com/flapi/add");

        let driver = signed(&backend);
        assert_eq!(driver.url("b.png", false, Some("x.png")), "https://ipfs.example.com/file/b.png");
        assert_eq!(driver.upload_endpoint(), "https://ipfs.example.com/api/add");
    }

    #[test]
    fn test_url_without_double_slashes() {
        let backend = Arc::new(MockBackend::new());
        let request = RequestContext { base_file: "/sub/index.php".to_string(), ..Default::default() };
        let driver = IpfsDriver::new(GatewayProtocol, &config("path"), &request, backend);
        let url = driver.url("//x.txt", false, None);
        assert_eq!(url, "/sub/flipfs/x.txt");
        assert!(!url.contains("//"));
    }

    #[tokio::test]
    async fn test_store_then_fetch_round_trip() {
        let backend = Arc::new(MockBackend::new());
        let content = Bytes::from(vec![0u8, 1, 2, 255, 10, 13]);

        let drivers: [Box<dyn StorageDriver>; 2] = [Box::new(gateway(&backend)), Box::new(signed(&backend))];

        for driver in drivers.iter() {
            let result = driver.store("bin.dat", content.clone(), false, None).await.unwrap();
            assert_eq!(result["Name"], "bin.dat");
            assert_eq!(driver.fetch("bin.dat", false).await.unwrap(), content);
        }
    }

    #[tokio::test]
    async fn test_fetch_adds_cache_buster() {
        let backend = Arc::new(MockBackend::new());
        let driver = gateway(&backend);
        driver.store("a.txt", Bytes::from_static(b"a"), false, None).await.unwrap();
        driver.fetch("a.txt", false).await.unwrap();

        let last = backend.requests().pop().unwrap();
        assert_eq!(last.method, "GET");
        assert!(last.url.starts_with("https://ipfs.example.com/flipfs/a.txt?e="));
        let ts: i64 = last.url.rsplit("?e=").next().unwrap().parse().unwrap();
        assert!(ts > 0);
    }

    #[tokio::test]
    async fn test_fetch_missing_is_transport_error() {
        let backend = Arc::new(MockBackend::new());
        let err = gateway(&backend).fetch("missing", false).await.unwrap_err();
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn test_store_malformed_response_is_protocol_error() {
        let backend = Arc::new(MockBackend::new());
        backend.respond_with("/flapi/add", "<html>bad gateway</html>");
        let err = gateway(&backend)
            .store("a.txt", Bytes::from_static(b"a"), false, None)
            .await
            .unwrap_err();
        assert!(err.is_protocol());
    }

    #[tokio::test]
    async fn test_exists_follows_info() {
        let backend = Arc::new(MockBackend::new());
        let drivers: [Box<dyn StorageDriver>; 2] = [Box::new(gateway(&backend)), Box::new(signed(&backend))];

        for driver in drivers.iter() {
            // (a) success
            driver.store("here.txt", Bytes::from_static(b"x"), false, None).await.unwrap();
            let info = driver.info("here.txt", false, None).await.unwrap().unwrap();
            assert_eq!(info.name, "here.txt");
            assert_eq!(info.key, "here.txt");
            assert_eq!(info.url, driver.url("here.txt", false, None));
            assert!(driver.exists("here.txt", false).await.unwrap());

            // (b) failure response
            assert!(driver.info("gone.txt", false, None).await.unwrap().is_none());
            assert!(!driver.exists("gone.txt", false).await.unwrap());
        }

        // (c) malformed bodies
        backend.respond_with("/flapi/files/stat", "not json");
        backend.respond_with("/api/info", "");
        for driver in drivers.iter() {
            assert!(driver.info("here.txt", false, None).await.unwrap().is_none());
            assert!(!driver.exists("here.txt", false).await.unwrap());
        }
    }

    #[tokio::test]
    async fn test_info_transport_failure_is_raised() {
        let backend = Arc::new(MockBackend::new());
        backend.fail_on("/flapi/files/stat");
        let err = gateway(&backend).info("a", false, None).await.unwrap_err();
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn test_delete_missing_returns_false() {
        let backend = Arc::new(MockBackend::new());
        assert!(!gateway(&backend).delete("nothing", false).await.unwrap());
        assert!(!signed(&backend).delete("nothing", false).await.unwrap());
    }

    #[tokio::test]
    async fn test_gateway_error_reply_means_missing() {
        let backend = Arc::new(MockBackend::new());
        let error = r#"{"Message":"file does not exist","Code":0,"Type":"error"}"#;
        backend.respond_with("/flapi/files/rm", error);
        backend.respond_with("/flapi/files/stat", error);

        let driver = gateway(&backend);
        assert!(!driver.delete("gone.txt", false).await.unwrap());
        assert!(driver.info("gone.txt", false, None).await.unwrap().is_none());
        assert!(!driver.exists("gone.txt", false).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_existing() {
        let backend = Arc::new(MockBackend::new());
        let driver = signed(&backend);
        driver.store("d.txt", Bytes::from_static(b"d"), false, None).await.unwrap();
        assert!(driver.delete("d.txt", false).await.unwrap());
        assert!(!driver.exists("d.txt", false).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_malformed_response_is_protocol_error() {
        let backend = Arc::new(MockBackend::new());
        backend.respond_with("/flapi/files/rm", "");
        let err = gateway(&backend).delete("x", false).await.unwrap_err();
        assert!(err.is_protocol());
    }

    #[tokio::test]
    async fn test_signed_requests_carry_valid_signature() {
        let backend = Arc::new(MockBackend::new());
        let driver = signed(&backend);
        driver.store("s.txt", Bytes::from_static(b"s"), false, None).await.unwrap();
        driver.info("s.txt", false, None).await.unwrap();
        driver.delete("s.txt", false).await.unwrap();

        let posts: Vec<_> = backend.requests().into_iter().filter(|r| r.method != "GET").collect();
        assert_eq!(posts.len(), 3);
        for req in posts {
            let time: i64 = req.field("time").unwrap().parse().unwrap();
            assert_eq!(req.field("api_user"), Some("u1"));
            assert_eq!(req.field("filename"), Some("s.txt"));
            assert_eq!(req.field("sign"), Some(calc_sign("u1", time, "s1").as_str()));
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_info_is_isolated() {
        let backend = Arc::new(MockBackend::new());
        let driver = Arc::new(signed(&backend));
        for i in 0..16 {
            driver.store(&format!("f{}", i), Bytes::from(vec![i as u8]), false, None).await.unwrap();
        }

        let mut handles = Vec::new();
        for i in 0..16 {
            let driver = driver.clone();
            handles.push(tokio::spawn(async move {
                let name = format!("f{}", i);
                let info = driver.info(&name, false, None).await.unwrap().unwrap();
                assert_eq!(info.name, name);
                assert_eq!(info.meta["size"], 1);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let infos: Vec<_> = backend.requests().into_iter().filter(|r| r.url.ends_with("/api/info")).collect();
        assert_eq!(infos.len(), 16);
        for req in infos {
            let time: i64 = req.field("time").unwrap().parse().unwrap();
            assert_eq!(req.field("sign"), Some(calc_sign("u1", time, "s1").as_str()));
        }
    }
}
