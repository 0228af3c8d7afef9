//! Backends that publish a JSON status document over HTTP.

use async_trait::async_trait;
use serverboard_query::http::HttpStatusClient;
use serverboard_query::{Probe, QueryError};
use std::time::Duration;

use super::QueryAdapter;
use crate::config::ServerConfig;

pub struct HttpJsonAdapter {
    client: HttpStatusClient,
}

impl HttpJsonAdapter {
    pub fn new(timeout: Duration, user_agent: &str) -> Self {
        Self {
            client: HttpStatusClient::new(timeout, user_agent),
        }
    }
}

#[async_trait]
impl QueryAdapter for HttpJsonAdapter {
    fn kind(&self) -> &str {
        "http-json"
    }

    fn check(&self, server: &ServerConfig) -> Result<(), String> {
        match server.connection.url.as_deref() {
            Some(url) if url.starts_with("http://") || url.starts_with("https://") => Ok(()),
            Some(url) => Err(format!("url '{url}' must be http:// or https://")),
            None => Err("http-json servers need a url".to_string()),
        }
    }

    async fn query(&self, server: &ServerConfig) -> Result<Probe, QueryError> {
        let Some(url) = server.connection.url.as_deref() else {
            return Err(QueryError::invalid("http-json server has no url configured"));
        };
        self.client.probe(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_requires_http_url() {
        let adapter = HttpJsonAdapter::new(Duration::from_secs(1), "test");
        let mut server = ServerConfig::new("SCP", "http-json", "https://example.net");
        assert!(adapter.check(&server).is_err());
        server.connection.url = Some("ftp://example.net/status".into());
        assert!(adapter.check(&server).is_err());
        server.connection.url = Some("https://api.example.net/status".into());
        assert!(adapter.check(&server).is_ok());
    }

    #[tokio::test]
    async fn test_missing_url_is_invalid() {
        let adapter = HttpJsonAdapter::new(Duration::from_secs(1), "test");
        let server = ServerConfig::new("SCP", "http-json", "https://example.net");
        let err = adapter.query(&server).await.unwrap_err();
        assert!(matches!(err, QueryError::InvalidResponse(_)));
    }
}
