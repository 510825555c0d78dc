// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT
use serde::Deserialize;
use serde_json::json;
use url::Url;

use crate::jsonrpc::{
    build_jsonrpc_request, parse_jsonrpc_response, JsonRpcClient, JsonRpcClientImpl, NO_PARAMS,
};

#[test]
fn test_build_request() {
    let req = build_jsonrpc_request("info.getNetworkID", NO_PARAMS).unwrap();
    assert_eq!(
        req,
        json!({"jsonrpc": "2.0", "id": 1, "method": "info.getNetworkID"})
    );

    let req = build_jsonrpc_request("info.getBlockchainID", json!({"alias": "X"})).unwrap();
    assert_eq!(req["params"]["alias"], "X");

    assert!(build_jsonrpc_request("info.getNetworkID", json!(1)).is_err());
}

#[test]
fn test_parse_response() {
    #[derive(Debug, Deserialize)]
    struct NetworkId {
        #[serde(rename = "networkID")]
        network_id: String,
    }

    let ok: NetworkId =
        parse_jsonrpc_response(r#"{"jsonrpc":"2.0","id":1,"result":{"networkID":"5"}}"#).unwrap();
    assert_eq!(ok.network_id, "5");

    let err = parse_jsonrpc_response::<NetworkId>(
        r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32000,"message":"not found"}}"#,
    )
    .unwrap_err();
    assert!(err.to_string().contains("not found"));

    // a missing result reads as unit
    parse_jsonrpc_response::<()>(r#"{"jsonrpc":"2.0","id":1}"#).unwrap();

    assert!(
        parse_jsonrpc_response::<NetworkId>(r#"{"jsonrpc":"1.0","id":1,"result":{}}"#).is_err()
    );
}

#[tokio::test]
async fn test_request_error() {
    // nothing listens on the discard port
    let url = Url::parse("http://127.0.0.1:9/ext/info").unwrap();
    let client = JsonRpcClientImpl::new(url, None);
    let response = client
        .request::<serde_json::Value>("info.getNetworkID", NO_PARAMS)
        .await;
    assert!(response.is_err());
}
