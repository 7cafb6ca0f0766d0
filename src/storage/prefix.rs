//! Base URL resolution / 访问前缀解析

use std::fmt;

use super::context::{RequestContext, StorageConfig};

/// Resolved base URL or path for every endpoint a driver builds / 已解析的访问前缀
///
/// Never ends with `/`. May be empty when files are served from the web root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPrefix(String);

impl ResolvedPrefix {
    /// Resolve from configuration and the current request / 根据配置和当前请求解析前缀
    ///
    /// | protocol | prefix |
    /// |---|---|
    /// | `follow` | same as the request scheme |
    /// | `auto` | `//{domain}` |
    /// | `http`, `https` | `{scheme}://{domain}` |
    /// | `path` and anything else | directory of the entry file |
    pub fn resolve(config: &StorageConfig, request: &RequestContext) -> Self {
        let scheme = match config.http_protocol.as_str() {
            "" | "follow" => request.scheme.to_lowercase(),
            other => other.to_string(),
        };

        let domain = if config.http_domain.is_empty() {
            request.host.as_str()
        } else {
            config.http_domain.as_str()
        };
        let domain = domain.trim_end_matches('/');

        match scheme.as_str() {
            "auto" => Self(format!("//{}", domain)),
            "http" | "https" => Self(format!("{}://{}", scheme, domain)),
            _ => Self::from_base_file(&request.base_file),
        }
    }

    /// Prefix built from the entry file's directory / 入口文件所在目录
    pub fn from_base_file(base_file: &str) -> Self {
        let base_file = base_file.replace('\\', "/");
        let dir = match base_file.rfind('/') {
            Some(pos) => &base_file[..pos],
            None => "",
        };

        let parts: Vec<&str> = dir.split('/').filter(|p| !p.is_empty() && *p != ".").collect();
        if parts.is_empty() {
            Self(String::new())
        } else {
            Self(format!("/{}", parts.join("/")))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Append an endpoint, keeping exactly one `/` at the join / 拼接端点
    pub fn join(&self, endpoint: &str) -> String {
        format!("{}/{}", self.0, endpoint.trim_start_matches('/'))
    }
}

impl fmt::Display for ResolvedPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
