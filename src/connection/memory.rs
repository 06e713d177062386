use super::into_response;
use crate::core::{IndexError, Result};
use crate::interface::{Method, RequestBody, Transport, TransportResponse};
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// A request as it reached the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<RequestBody>,
}

impl RecordedRequest {
    /// The JSON payload, if the request carried one.
    pub fn json(&self) -> Option<&JsonValue> {
        match &self.body {
            Some(RequestBody::Json(json)) => Some(json),
            _ => None,
        }
    }

    /// The NDJSON payload, if the request carried one.
    pub fn ndjson(&self) -> Option<&str> {
        match &self.body {
            Some(RequestBody::NdJson(lines)) => Some(lines),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct ScriptedResponse {
    method: Method,
    path: String,
    status: u16,
    body: String,
}

/// A scripted `Transport` for tests.
///
/// Answers requests strictly in the order they were scripted and records
/// every request it receives. A request that does not match the next scripted
/// method and path fails with `IndexError::Transport`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTransport {
    script: Arc<Mutex<VecDeque<ScriptedResponse>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl InMemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a JSON answer for the next `method path` request.
    pub fn respond(self, method: Method, path: impl Into<String>, status: u16, body: JsonValue) -> Self {
        let body = if body.is_null() { String::new() } else { body.to_string() };
        self.respond_raw(method, path, status, body)
    }

    /// Queue an answer with a raw, possibly non-JSON, body.
    pub fn respond_raw(
        self,
        method: Method,
        path: impl Into<String>,
        status: u16,
        body: impl Into<String>,
    ) -> Self {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(ScriptedResponse {
                method,
                path: path.into(),
                status,
                body: body.into(),
            });
        }
        self
    }

    /// Every request received so far, in arrival order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    /// Number of scripted answers not yet consumed.
    pub fn pending(&self) -> usize {
        self.script.lock().map(|script| script.len()).unwrap_or(0)
    }
}

#[async_trait]
impl Transport for InMemoryTransport {
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<RequestBody>,
    ) -> Result<TransportResponse> {
        self.requests
            .lock()
            .map_err(|_| IndexError::Transport("request log poisoned".to_string()))?
            .push(RecordedRequest {
                method,
                path: path.to_string(),
                body,
            });

        let next = self
            .script
            .lock()
            .map_err(|_| IndexError::Transport("script poisoned".to_string()))?
            .pop_front();

        match next {
            Some(scripted) if scripted.method == method && scripted.path == path => {
                into_response(scripted.status, scripted.body)
            }
            Some(scripted) => Err(IndexError::Transport(format!(
                "unexpected request {} {} (scripted {} {})",
                method, path, scripted.method, scripted.path
            ))),
            None => Err(IndexError::Transport(format!(
                "unexpected request {} {} (script exhausted)",
                method, path
            ))),
        }
    }
}
