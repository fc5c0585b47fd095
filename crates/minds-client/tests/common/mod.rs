//! Common test utilities for integration tests.

#![allow(dead_code)]

use minds_client::MindsClient;
use serde_json::{json, Value};
use wiremock::{MockServer, Request};

pub const API_KEY: &str = "test-key";

/// Client pointed at the mock server for both control plane and completions.
pub fn client(server: &MockServer) -> MindsClient {
    MindsClient::builder()
        .api_key(API_KEY)
        .base_url(server.uri())
        .completion_base_url(server.uri())
        .build()
        .expect("client should build")
}

/// A mind as the server reports it.
pub fn mind_json(name: &str) -> Value {
    json!({
        "model_name": "gpt-4o",
        "name": name,
        "datasources": ["example_ds"],
        "knowledge_bases": ["example_kb"],
        "provider": "openai",
        "parameters": {
            "prompt_template": "Answer the user's question"
        },
        "created_at": "Thu, 26 Sep 2024 13:40:57 GMT",
        "updated_at": "Thu, 26 Sep 2024 13:40:57 GMT",
    })
}

/// Requests the server received with the given method and path.
pub async fn requests_to(server: &MockServer, method: &str, path: &str) -> Vec<Request> {
    server
        .received_requests()
        .await
        .expect("request recording is enabled")
        .into_iter()
        .filter(|r| r.method.as_str() == method && r.url.path() == path)
        .collect()
}

/// JSON body of a recorded request.
pub fn body(request: &Request) -> Value {
    serde_json::from_slice(&request.body).expect("request body is JSON")
}
