use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use yieldfarm_core::error::{RawFailure, codes};

use super::abi;

/// A JSON-RPC request/response channel.
///
/// The wallet and reader only depend on this trait, so tests can script
/// endpoint answers without a server.
#[async_trait]
pub trait RpcTransport: Send + Sync {
    /// Sends `method` with positional `params` and returns the `result` member.
    ///
    /// # Returns
    ///
    /// - `Ok(Value)`: the `result` member (`Value::Null` when the node returned null)
    /// - `Err(RawFailure)`: the endpoint was unreachable, answered with an
    ///   error object, or answered with something undecodable
    async fn request(&self, method: &str, params: Value) -> Result<Value, RawFailure>;
}

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Deserialize, Debug)]
struct RpcErrorObject {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

impl From<RpcErrorObject> for RawFailure {
    fn from(err: RpcErrorObject) -> Self {
        let revert_reason = err
            .data
            .as_ref()
            .and_then(Value::as_str)
            .and_then(abi::decode_revert_reason);

        // Keep the node's message and append the decoded reason in geth's
        // spelling so the classifier finds it.
        let reason = match revert_reason {
            Some(revert) if !err.message.contains(&revert) => {
                format!("execution reverted: {revert}")
            }
            _ => err.message,
        };
        RawFailure::new(err.code.to_string(), reason)
    }
}

/// JSON-RPC 2.0 over HTTP POST.
pub struct JsonRpcTransport {
    client: Client,
    url: String,
    next_id: AtomicU64,
}

impl JsonRpcTransport {
    /// Creates a transport for `url` with a per-request timeout.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, RawFailure> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| RawFailure::with_reason(format!("Failed to build HTTP client: {err}")))?;
        Ok(Self {
            client,
            url: url.into(),
            next_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl RpcTransport for JsonRpcTransport {
    async fn request(&self, method: &str, params: Value) -> Result<Value, RawFailure> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = RpcRequest {
            jsonrpc: "2.0",
            id,
            method,
            params,
        };
        debug!(id, method, url = %self.url, "JSON-RPC request");

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|err| {
                let code = if err.is_timeout() {
                    codes::TIMEOUT
                } else if err.is_connect() {
                    codes::UNREACHABLE
                } else {
                    codes::DECODE
                };
                RawFailure::new(code, format!("{method} request failed: {err}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            return Err(RawFailure::new(
                status.as_u16().to_string(),
                format!("{method} returned HTTP {status}: {body_text}"),
            ));
        }

        let parsed: RpcResponse = response.json().await.map_err(|err| {
            RawFailure::new(codes::DECODE, format!("Failed to parse {method} response: {err}"))
        })?;
        parse_response(method, parsed)
    }
}

fn parse_response(method: &str, response: RpcResponse) -> Result<Value, RawFailure> {
    if let Some(error) = response.error {
        debug!(method, code = error.code, message = %error.message, "JSON-RPC error");
        return Err(error.into());
    }
    Ok(response.result.unwrap_or(Value::Null))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(raw: Value) -> Result<Value, RawFailure> {
        parse_response("eth_call", serde_json::from_value(raw).unwrap())
    }

    #[test]
    fn test_result_member_is_returned() {
        let value = parse(json!({"jsonrpc": "2.0", "id": 1, "result": "0x10"})).unwrap();
        assert_eq!(value, json!("0x10"));

        let value = parse(json!({"jsonrpc": "2.0", "id": 2, "result": null})).unwrap();
        assert_eq!(value, Value::Null);
    }

    #[test]
    fn test_error_object_becomes_raw_failure() {
        let err = parse(json!({
            "jsonrpc": "2.0",
            "id": 3,
            "error": {"code": 4001, "message": "User rejected the request."}
        }))
        .unwrap_err();

        assert_eq!(err, RawFailure::new("4001", "User rejected the request."));
    }

    #[test]
    fn test_revert_data_is_decoded_into_reason() {
        let err = parse(json!({
            "jsonrpc": "2.0",
            "id": 4,
            "error": {
                "code": 3,
                "message": "execution reverted",
                "data": "0x08c379a0\
                    0000000000000000000000000000000000000000000000000000000000000020\
                    000000000000000000000000000000000000000000000000000000000000000b\
                    4c6f636b20616374697665000000000000000000000000000000000000000000"
            }
        }))
        .unwrap_err();

        assert!(err.has_code(codes::EXECUTION_REVERTED));
        assert_eq!(err.reason.as_deref(), Some("execution reverted: Lock active"));
    }

    #[test]
    fn test_malformed_revert_data_keeps_node_message() {
        let data = format!("0x08c379a0{:064x}", u128::from(u64::MAX));
        let err = parse(json!({
            "jsonrpc": "2.0",
            "id": 5,
            "error": {"code": 3, "message": "execution reverted", "data": data}
        }))
        .unwrap_err();

        assert_eq!(err, RawFailure::new("3", "execution reverted"));
    }

    #[test]
    fn test_request_serializes_as_jsonrpc_2() {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: 7,
            method: "eth_chainId",
            params: json!([]),
        };
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["jsonrpc"], "2.0");
        assert_eq!(value["id"], 7);
        assert_eq!(value["params"], json!([]));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_flagged() {
        // Port 9 (discard) on loopback is not expected to run a JSON-RPC node.
        let transport =
            JsonRpcTransport::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let err = transport.request("eth_accounts", json!([])).await.unwrap_err();

        assert!(err.has_code(codes::UNREACHABLE) || err.has_code(codes::TIMEOUT));
    }

    #[test]
    fn test_ids_increase() {
        let transport =
            JsonRpcTransport::new("http://127.0.0.1:8545", Duration::from_secs(1)).unwrap();
        let first = transport.next_id.fetch_add(1, Ordering::Relaxed);
        let second = transport.next_id.fetch_add(1, Ordering::Relaxed);
        assert!(second > first);
        assert_eq!(transport.url(), "http://127.0.0.1:8545");
    }
}
