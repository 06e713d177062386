pub mod config;
pub mod memory;

use crate::core::{IndexError, Result};
use crate::interface::{Method, RequestBody, Transport, TransportResponse};
use async_trait::async_trait;
use config::ConnectionConfig;
use serde_json::Value as JsonValue;
use tracing::debug;

/// Transport over HTTP
///
/// Wraps one `reqwest::Client`, reused for every request. Authentication is
/// applied per request: API key first, then basic auth.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    config: ConnectionConfig,
}

impl HttpTransport {
    pub fn new(config: ConnectionConfig) -> Result<Self> {
        config.validate().map_err(IndexError::Validation)?;

        let mut builder = reqwest::Client::builder().connect_timeout(config.connect_timeout);
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.url, path.trim_start_matches('/'))
    }
}

fn to_reqwest(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Head => reqwest::Method::HEAD,
        Method::Put => reqwest::Method::PUT,
        Method::Post => reqwest::Method::POST,
        Method::Delete => reqwest::Method::DELETE,
    }
}

/// Turns a raw status and body into the transport result.
///
/// Non-2xx answers keep their body text untouched; 2xx bodies are parsed as
/// JSON, an empty body becoming `Null`.
pub(crate) fn into_response(status: u16, body: String) -> Result<TransportResponse> {
    if !(200..300).contains(&status) {
        return Err(IndexError::Store { status, body });
    }

    let parsed = if body.trim().is_empty() {
        JsonValue::Null
    } else {
        serde_json::from_str(&body)?
    };
    Ok(TransportResponse::new(status, parsed))
}

#[async_trait]
impl Transport for HttpTransport {
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<RequestBody>,
    ) -> Result<TransportResponse> {
        let url = self.endpoint(path);
        debug!(%method, %url, "store request");

        let mut request = self.client.request(to_reqwest(method), &url);

        if let Some(api_key) = &self.config.api_key {
            request = request.header("Authorization", format!("ApiKey {}", api_key));
        } else if let Some(username) = &self.config.username {
            request = request.basic_auth(username, self.config.password.as_ref());
        }

        request = match body {
            Some(RequestBody::Json(json)) => request.json(&json),
            Some(RequestBody::NdJson(lines)) => request
                .header("Content-Type", "application/x-ndjson")
                .body(lines),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;
        debug!(%method, %url, status, "store response");

        into_response(status, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_paths() {
        let transport = HttpTransport::new(ConnectionConfig::new("http://localhost:9200/")).unwrap();
        assert_eq!(transport.endpoint("/_bulk"), "http://localhost:9200/_bulk");
        assert_eq!(transport.endpoint("logs/_doc/1"), "http://localhost:9200/logs/_doc/1");
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = HttpTransport::new(ConnectionConfig::new("ftp://nowhere"));
        assert!(matches!(result, Err(IndexError::Validation(_))));
    }

    #[test]
    fn test_into_response() {
        let ok = into_response(200, r#"{"acknowledged":true}"#.into()).unwrap();
        assert!(ok.acknowledged());

        let empty = into_response(200, String::new()).unwrap();
        assert_eq!(empty.body, JsonValue::Null);

        match into_response(503, "unavailable".into()) {
            Err(IndexError::Store { status, body }) => {
                assert_eq!(status, 503);
                assert_eq!(body, "unavailable");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }
}
