//! JSON-RPC 2.0 request/response envelopes.
//!
//! Every request carries a fresh `u64` id from the dispatcher's counter;
//! the response router uses that id to hand the reply back to the caller.

use serde::{Deserialize, Serialize};

/// An outgoing JSON-RPC request.
#[derive(Debug, Clone, Serialize)]
pub struct RpcRequest {
    /// Correlation id, unique per in-flight request.
    pub id: u64,

    /// Always `"2.0"`.
    pub jsonrpc: &'static str,

    /// Cortex method name (see [`Methods`](super::Methods)).
    pub method: &'static str,

    /// Method parameters. Omitted entirely when the method takes none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
}

impl RpcRequest {
    /// Build a request, dropping an empty params object from the wire.
    pub fn new(id: u64, method: &'static str, params: serde_json::Value) -> Self {
        let params = match &params {
            serde_json::Value::Object(map) if map.is_empty() => None,
            serde_json::Value::Null => None,
            _ => Some(params),
        };
        Self {
            id,
            jsonrpc: "2.0",
            method,
            params,
        }
    }
}

/// An incoming JSON-RPC response.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcResponse {
    /// Correlation id echoed by the service. Absent on unsolicited frames.
    pub id: Option<u64>,

    /// Result payload on success.
    #[serde(default)]
    pub result: Option<serde_json::Value>,

    /// Error payload on failure.
    #[serde(default)]
    pub error: Option<RpcError>,
}

/// The `error` member of a JSON-RPC response.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serializes_with_params() {
        let req = RpcRequest::new(7, "subscribe", serde_json::json!({"streams": ["pow"]}));
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["jsonrpc"], "2.0");
        assert_eq!(json["method"], "subscribe");
        assert_eq!(json["params"]["streams"][0], "pow");
    }

    #[test]
    fn test_request_omits_empty_params() {
        let req = RpcRequest::new(1, "getUserLogin", serde_json::json!({}));
        let json = serde_json::to_string(&req).unwrap();
        assert!(!json.contains("params"));
    }

    #[test]
    fn test_response_with_error() {
        let raw = r#"{"id": 3, "jsonrpc": "2.0", "error": {"code": -32601, "message": "no such method"}}"#;
        let resp: RpcResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(resp.id, Some(3));
        assert!(resp.result.is_none());
        let err = resp.error.unwrap();
        assert_eq!(err.code, -32601);
        assert_eq!(err.message, "no such method");
    }

    #[test]
    fn test_response_without_id() {
        let raw = r#"{"jsonrpc": "2.0", "result": {}}"#;
        let resp: RpcResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(resp.id, None);
    }
}
