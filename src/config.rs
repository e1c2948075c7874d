//! Configuration for the upload client and the parse server.
//!
//! Both sides are configured through a plain struct with documented
//! defaults, built via a builder that validates its constraints. The CLI maps
//! its flags onto these builders; library callers set only what they need.

use crate::error::ReportError;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Path of the parse endpoint on the server.
pub const PARSE_ROUTE: &str = "/api/parse";

/// Default listen address of the server, and therefore of the client's endpoint.
pub const DEFAULT_ADDR: &str = "127.0.0.1:5001";

/// Configuration for uploading a report to a parse server.
///
/// # Example
/// ```rust
/// use ot_cards::ClientConfig;
///
/// let config = ClientConfig::builder()
///     .endpoint("http://10.0.0.5:5001/api/parse")
///     .timeout_secs(30)
///     .build()
///     .unwrap();
/// assert_eq!(config.timeout_secs, 30);
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Full URL of the parse endpoint. Default: `http://127.0.0.1:5001/api/parse`.
    pub endpoint: String,

    /// Whole-request timeout in seconds. Default: 120.
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: format!("http://{DEFAULT_ADDR}{PARSE_ROUTE}"),
            timeout_secs: 120,
        }
    }
}

impl ClientConfig {
    /// Create a new builder for `ClientConfig`.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.config.endpoint = url.into();
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = secs;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ClientConfig, ReportError> {
        let c = &self.config;
        if !(c.endpoint.starts_with("http://") || c.endpoint.starts_with("https://")) {
            return Err(ReportError::InvalidConfig(format!(
                "endpoint must be an HTTP/HTTPS URL, got '{}'",
                c.endpoint
            )));
        }
        if c.timeout_secs == 0 {
            return Err(ReportError::InvalidConfig("timeout must be ≥ 1s".into()));
        }
        Ok(self.config)
    }
}

/// Configuration for the parse server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address. Default: `127.0.0.1:5001`.
    pub addr: SocketAddr,

    /// Directory served for every path other than the parse endpoint. Default: `.`.
    ///
    /// `/` resolves to `index.html` inside it.
    pub static_dir: PathBuf,

    /// Largest accepted request body in bytes. Default: 20 MiB.
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 5001)),
            static_dir: PathBuf::from("."),
            max_upload_bytes: 20 * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    /// Create a new builder for `ServerConfig`.
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder {
            config: Self::default(),
            addr: None,
        }
    }
}

/// Builder for [`ServerConfig`].
#[derive(Debug)]
pub struct ServerConfigBuilder {
    config: ServerConfig,
    addr: Option<String>,
}

impl ServerConfigBuilder {
    /// Listen address as `host:port`; parsed in [`build`](Self::build).
    pub fn addr(mut self, addr: impl Into<String>) -> Self {
        self.addr = Some(addr.into());
        self
    }

    pub fn static_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.static_dir = dir.into();
        self
    }

    pub fn max_upload_bytes(mut self, n: usize) -> Self {
        self.config.max_upload_bytes = n;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(mut self) -> Result<ServerConfig, ReportError> {
        if let Some(addr) = self.addr.take() {
            self.config.addr = addr.parse().map_err(|e| {
                ReportError::InvalidConfig(format!("invalid listen address '{addr}': {e}"))
            })?;
        }
        if self.config.max_upload_bytes == 0 {
            return Err(ReportError::InvalidConfig(
                "upload limit must be ≥ 1 byte".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_defaults_point_at_local_server() {
        let c = ClientConfig::default();
        assert_eq!(c.endpoint, "http://127.0.0.1:5001/api/parse");
        assert_eq!(c.timeout_secs, 120);
    }

    #[test]
    fn client_rejects_non_http_endpoint() {
        let err = ClientConfig::builder()
            .endpoint("ftp://example.com/api/parse")
            .build()
            .unwrap_err();
        assert!(matches!(err, ReportError::InvalidConfig(_)));
    }

    #[test]
    fn client_rejects_zero_timeout() {
        assert!(ClientConfig::builder().timeout_secs(0).build().is_err());
    }

    #[test]
    fn server_builder_parses_addr() {
        let c = ServerConfig::builder()
            .addr("0.0.0.0:8080")
            .static_dir("public")
            .build()
            .unwrap();
        assert_eq!(c.addr.port(), 8080);
        assert_eq!(c.static_dir, PathBuf::from("public"));
        assert_eq!(c.max_upload_bytes, 20 * 1024 * 1024);
    }

    #[test]
    fn server_builder_rejects_bad_addr() {
        let err = ServerConfig::builder().addr("localhost").build().unwrap_err();
        assert!(err.to_string().contains("localhost"), "got: {err}");
    }
}
