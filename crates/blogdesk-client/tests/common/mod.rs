//! Shared fixtures for the client integration tests

#![allow(dead_code)]

use blogdesk_client::ApiClient;
use blogdesk_core::config::ApiConfig;
use blogdesk_core::{Credential, MemoryCredentialStore};
use chrono::Utc;
use serde_json::{Value, json};
use std::sync::Once;
use wiremock::MockServer;

static INIT_LOGGER: Once = Once::new();

/// Initialize test logging (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_test_writer()
            .try_init();
    });
}

/// Token stored by [`signed_in_client`]
pub const TOKEN: &str = "test-token";

/// Client pointed at `server`'s `/api` prefix, with an empty credential store
pub fn client(server: &MockServer) -> (ApiClient<MemoryCredentialStore>, MemoryCredentialStore) {
    init_test_logging();
    let config = ApiConfig {
        base_url: format!("{}/api", server.uri()),
        timeout_secs: 5,
        ..ApiConfig::default()
    };
    let store = MemoryCredentialStore::new();
    let client = ApiClient::new(&config, store.clone()).unwrap();
    (client, store)
}

/// Like [`client`], with a valid credential already stored
pub fn signed_in_client(
    server: &MockServer,
) -> (ApiClient<MemoryCredentialStore>, MemoryCredentialStore) {
    let (client, store) = client(server);
    blogdesk_core::CredentialStore::save(&store, &Credential::issue(TOKEN, 7, Utc::now())).unwrap();
    (client, store)
}

/// A blog as the server returns it
pub fn blog_json(id: &str) -> Value {
    json!({
        "_id": id,
        "title": "A",
        "shortDescription": "Teaser",
        "category": "webDevelopment",
        "author": "",
        "tags": ["x"],
        "image": "https://cdn.example.com/a.png",
        "description": "<p>body</p>",
        "createdAt": "2024-03-15T14:25:30.000Z"
    })
}

/// Names of the multipart fields in a raw request body
pub fn multipart_field_names(body: &[u8]) -> Vec<String> {
    let body = String::from_utf8_lossy(body);
    body.split("; name=\"")
        .skip(1)
        .filter_map(|rest| rest.split('"').next())
        .map(ToString::to_string)
        .collect()
}
