//! JSON-RPC 2.0 wire types for the tool protocol
//!
//! One frame carries one message. The request `id` doubles as the
//! correlation id: whatever the client sends is echoed on the response.

use std::fmt;

use rmcp::model::JsonObject;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{McpError, McpResult};

pub const JSONRPC_VERSION: &str = "2.0";

/// Protocol revisions this server can speak, newest last
pub const SUPPORTED_PROTOCOL_VERSIONS: &[&str] = &["2024-11-05", "2025-03-26", "2025-06-18"];

pub const LATEST_PROTOCOL_VERSION: &str = "2025-06-18";

/// Request identifier as sent by the client
///
/// Numeric ids keep their JSON form, so unsigned 64-bit ids echo back
/// unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    Number(serde_json::Number),
    String(String),
}

impl From<i64> for RequestId {
    fn from(value: i64) -> Self {
        RequestId::Number(value.into())
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestId::Number(n) => write!(f, "{}", n),
            RequestId::String(s) => f.write_str(s),
        }
    }
}

/// Inbound message; without an `id` it is a notification
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Option<RequestId>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    /// Whether the frame declares the `"2.0"` envelope
    pub fn is_v2(&self) -> bool {
        self.jsonrpc == JSONRPC_VERSION
    }
}

/// Outbound reply to a request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: RequestId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<McpError>,
}

impl JsonRpcResponse {
    pub fn from_outcome(id: RequestId, outcome: McpResult<Value>) -> Self {
        let (result, error) = match outcome {
            Ok(value) => (Some(value), None),
            Err(err) => (None, Some(err)),
        };
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result,
            error,
        }
    }
}

/// Params of a `tools/call` request
#[derive(Debug, Clone, Deserialize)]
pub struct CallToolParams {
    #[serde(alias = "tool")]
    pub name: String,
    #[serde(default)]
    pub arguments: Option<JsonObject>,
}

/// Identity reported in `initialize` and by health endpoints
#[derive(Debug, Clone)]
pub struct ServerIdentity {
    pub name: String,
    pub version: String,
    pub instructions: Option<String>,
}

impl ServerIdentity {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            instructions: None,
        }
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    /// Build the `initialize` result, echoing the client's protocol
    /// revision when we support it
    pub fn initialize_result(&self, params: Option<&Value>) -> Value {
        let requested = params
            .and_then(|p| p.get("protocolVersion"))
            .and_then(Value::as_str);
        let version = match requested {
            Some(v) if SUPPORTED_PROTOCOL_VERSIONS.contains(&v) => v,
            _ => LATEST_PROTOCOL_VERSION,
        };

        let mut result = json!({
            "protocolVersion": version,
            "capabilities": { "tools": {} },
            "serverInfo": {
                "name": self.name,
                "version": self.version,
            },
        });
        if let (Some(instructions), Some(obj)) = (&self.instructions, result.as_object_mut()) {
            obj.insert("instructions".to_string(), json!(instructions));
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_id_round_trips_as_sent() {
        let numeric: JsonRpcRequest =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":7,"method":"ping"}"#).unwrap();
        assert_eq!(numeric.id, Some(RequestId::from(7)));

        let text: JsonRpcRequest =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":"abc","method":"ping"}"#).unwrap();
        assert_eq!(text.id, Some(RequestId::String("abc".to_string())));

        let reply = JsonRpcResponse::from_outcome(text.id.unwrap(), Ok(json!({})));
        let wire = serde_json::to_value(&reply).unwrap();
        assert_eq!(wire["id"], "abc");
        assert!(wire.get("error").is_none());
    }

    #[test]
    fn test_unsigned_id_echoes_unchanged() {
        let request: JsonRpcRequest = serde_json::from_str(
            r#"{"jsonrpc":"2.0","id":18446744073709551615,"method":"ping"}"#,
        )
        .unwrap();
        let id = request.id.unwrap();
        assert_eq!(id.to_string(), "18446744073709551615");

        let wire = serde_json::to_string(&JsonRpcResponse::from_outcome(id, Ok(json!({})))).unwrap();
        assert!(wire.contains(r#""id":18446744073709551615"#));
    }

    #[test]
    fn test_version_is_checked() {
        let current: JsonRpcRequest =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#).unwrap();
        assert!(current.is_v2());

        let legacy: JsonRpcRequest =
            serde_json::from_str(r#"{"jsonrpc":"1.0","id":1,"method":"ping"}"#).unwrap();
        assert!(!legacy.is_v2());
    }

    #[test]
    fn test_notification_has_no_id() {
        let note: JsonRpcRequest = serde_json::from_str(
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
        )
        .unwrap();
        assert!(note.id.is_none());
    }

    #[test]
    fn test_call_params_accept_tool_alias() {
        let params: CallToolParams =
            serde_json::from_value(json!({"tool": "list_documents", "arguments": {}})).unwrap();
        assert_eq!(params.name, "list_documents");
    }

    #[test]
    fn test_initialize_negotiates_version() {
        let identity = ServerIdentity::new("srv", "1.2.3").with_instructions("hello");

        let known = identity.initialize_result(Some(&json!({"protocolVersion": "2024-11-05"})));
        assert_eq!(known["protocolVersion"], "2024-11-05");
        assert_eq!(known["serverInfo"]["name"], "srv");
        assert_eq!(known["instructions"], "hello");

        let unknown = identity.initialize_result(Some(&json!({"protocolVersion": "1999-01-01"})));
        assert_eq!(unknown["protocolVersion"], LATEST_PROTOCOL_VERSION);
    }
}
