// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use serde_json::Value;
use std::time::Duration;
use url::Url;

#[cfg(test)]
mod tests;

const DEFAULT_JSON_RPC_VERSION: &str = "2.0";
const DEFAULT_JSON_RPC_ID: u8 = 1;
/// Request timeout of the RPC client.
pub const DEFAULT_REQ_TIMEOUT: Duration = Duration::from_secs(60);

/// A convenience constant that represents empty params in a JSON-RPC request.
pub const NO_PARAMS: Value = json!([]);

/// A simple async JSON-RPC client that sends one-shot requests via HTTP/HTTPS. The returned
/// results are deserialized into the type requested by the caller.
#[async_trait]
pub trait JsonRpcClient {
    /// Sends a JSON-RPC request with `method` and `params` via HTTP/HTTPS.
    async fn request<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T>;
}

/// The implementation of [`JsonRpcClient`].
pub struct JsonRpcClientImpl {
    http_client: Client,
    url: Url,
    timeout: Duration,
}

impl JsonRpcClientImpl {
    /// Creates a client that sends all requests to `url`.
    pub fn new(url: Url, timeout: Option<Duration>) -> Self {
        Self {
            http_client: Client::default(),
            url,
            timeout: timeout.unwrap_or(DEFAULT_REQ_TIMEOUT),
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl JsonRpcClient for JsonRpcClientImpl {
    async fn request<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        let request_body = build_jsonrpc_request(method, params)?;
        tracing::debug!("sending {method} to {}: {request_body}", self.url);

        let response = self
            .http_client
            .post(self.url.as_str())
            .json(&request_body)
            .timeout(self.timeout)
            .send()
            .await?;

        let response_body = response.text().await?;
        tracing::debug!("received raw response body: {:?}", response_body);

        parse_jsonrpc_response(&response_body)
    }
}

/// JsonRpcResponse wraps the json rpc response.
/// We could have encountered success or error, this struct handles the error and result and convert
/// them into Result.
#[derive(Debug, Deserialize)]
struct JsonRpcResponse<T> {
    id: u8,
    jsonrpc: String,

    result: Option<T>,
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

impl<T: DeserializeOwned> From<JsonRpcResponse<T>> for Result<T> {
    fn from(j: JsonRpcResponse<T>) -> Self {
        if let Some(e) = j.error {
            return Err(anyhow!("json_rpc error {}: {}", e.code, e.message));
        }
        match j.result {
            Some(result) => Ok(result),
            // The result is not found, but it is possible T could be the rust unit type: (), i.e.
            // the caller is expecting Result<()>.
            None => Ok(serde_json::from_value(serde_json::Value::Null)?),
        }
    }
}

fn parse_jsonrpc_response<T: DeserializeOwned>(response_body: &str) -> Result<T> {
    let value = serde_json::from_str::<JsonRpcResponse<T>>(response_body).map_err(|e| {
        tracing::error!("cannot parse json rpc client response: {:?}", response_body);
        anyhow!("cannot parse json rpc response: {response_body} due to {e}")
    })?;

    if value.id != DEFAULT_JSON_RPC_ID || value.jsonrpc != DEFAULT_JSON_RPC_VERSION {
        return Err(anyhow!("json_rpc id or version not matching."));
    }

    Result::from(value)
}

// A convenience function to build a JSON-RPC request.
fn build_jsonrpc_request(method: &str, params: Value) -> Result<Value> {
    let has_params = match &params {
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
        Value::Null => false,
        _ => return Err(anyhow!("params is not an array nor an object")),
    };

    let request_value = if has_params {
        json!({
            "jsonrpc": DEFAULT_JSON_RPC_VERSION,
            "id": DEFAULT_JSON_RPC_ID,
            "method": method,
            "params": params,
        })
    } else {
        json!({
            "jsonrpc": DEFAULT_JSON_RPC_VERSION,
            "id": DEFAULT_JSON_RPC_ID,
            "method": method,
        })
    };
    Ok(request_value)
}
