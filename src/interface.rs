use async_trait::async_trait;
use crate::core::Result;
use serde_json::Value as JsonValue;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Head,
    Put,
    Post,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Put => "PUT",
            Method::Post => "POST",
            Method::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

/// Request payload.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(JsonValue),
    /// Newline-delimited JSON, sent as `application/x-ndjson`.
    NdJson(String),
}

/// A successful (2xx) answer from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    /// Parsed JSON body, `Null` when the store sent nothing.
    pub body: JsonValue,
}

impl TransportResponse {
    pub fn new(status: u16, body: JsonValue) -> Self {
        Self { status, body }
    }

    /// The `acknowledged` flag of index and alias administration calls.
    pub fn acknowledged(&self) -> bool {
        self.body
            .get("acknowledged")
            .and_then(JsonValue::as_bool)
            .unwrap_or(false)
    }
}

/// The narrow seam every component talks to the store through.
///
/// Implementations turn any non-2xx answer into `IndexError::Store` with the
/// status and raw body intact, and connection-level failures into
/// `IndexError::Transport`. Authentication and retries belong to the
/// implementation, never to the callers of this trait.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<RequestBody>,
    ) -> Result<TransportResponse>;

    /// Check that the store answers at all.
    async fn ping(&self) -> Result<()> {
        self.request(Method::Get, "/", None).await.map(|_| ())
    }
}
