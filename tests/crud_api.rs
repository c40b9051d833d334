use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;

use taxograph::api::routes::create_router;
use taxograph::store::MemoryStore;

// Test client wrapper for making API calls
struct TestClient {
    client: Client,
    base_url: String,
}

impl TestClient {
    fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }

    async fn post(&self, path: &str, json: Value) -> reqwest::Result<reqwest::Response> {
        self.client
            .post(&format!("{}{}", self.base_url, path))
            .json(&json)
            .send()
            .await
    }

    async fn put(&self, path: &str, json: Value) -> reqwest::Result<reqwest::Response> {
        self.client
            .put(&format!("{}{}", self.base_url, path))
            .json(&json)
            .send()
            .await
    }

    async fn get(&self, path: &str) -> reqwest::Result<reqwest::Response> {
        self.client
            .get(&format!("{}{}", self.base_url, path))
            .send()
            .await
    }

    async fn delete(&self, path: &str) -> reqwest::Result<reqwest::Response> {
        self.client
            .delete(&format!("{}{}", self.base_url, path))
            .send()
            .await
    }

    async fn patch(&self, path: &str, json: Value) -> reqwest::Result<reqwest::Response> {
        self.client
            .patch(&format!("{}{}", self.base_url, path))
            .json(&json)
            .send()
            .await
    }
}

/// Serve the real router over a fresh in-memory store on an ephemeral
/// port, so every test runs against its own isolated service.
async fn spawn_server() -> TestClient {
    let store = Arc::new(MemoryStore::new());
    let app = create_router().with_state(store);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    TestClient::new(format!("http://{}", addr))
}

#[tokio::test]
async fn health_endpoint_responds() {
    let client = spawn_server().await;
    let resp = client.get("/health").await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn node_create_round_trips() {
    let client = spawn_server().await;

    let resp = client.post("/nodes", json!({"name": "Animal"})).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let location = resp
        .headers()
        .get("location")
        .expect("Location header missing")
        .to_str()
        .unwrap()
        .to_string();
    let created: Value = resp.json().await.unwrap();
    let key = created["_key"].as_str().expect("_key missing").to_string();
    assert_eq!(created["name"], "Animal");
    assert_eq!(created["_id"].as_str().unwrap(), format!("nodes/{}", key));
    assert!(created["_rev"].is_string());
    assert_eq!(location, format!("/nodes/{}", key));

    let resp = client.get(&format!("/nodes/{}", key)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched: Value = resp.json().await.unwrap();
    assert_eq!(fetched["name"], "Animal");
    assert_eq!(fetched["_key"], created["_key"]);
}

#[tokio::test]
async fn list_returns_the_full_collection() {
    let client = spawn_server().await;
    for name in ["Animal", "Plant", "Fungus"] {
        let resp = client.post("/nodes", json!({"name": name})).await.unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let resp = client.get("/nodes").await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let listed: Vec<Value> = resp.json().await.unwrap();
    assert_eq!(listed.len(), 3);
}

#[tokio::test]
async fn edge_create_keeps_endpoint_references() {
    let client = spawn_server().await;

    let resp = client
        .post(
            "/edges",
            json!({"_from": "nodes/1", "_to": "nodes/2", "label": "is_a"}),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = resp.json().await.unwrap();
    assert_eq!(created["_from"], "nodes/1");
    assert_eq!(created["_to"], "nodes/2");

    let resp = client.get("/edges").await.unwrap();
    let listed: Vec<Value> = resp.json().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["_from"], "nodes/1");
    assert_eq!(listed[0]["_to"], "nodes/2");
    assert_eq!(listed[0]["label"], "is_a");
}

#[tokio::test]
async fn edge_create_without_endpoints_is_a_server_error() {
    let client = spawn_server().await;
    let resp = client
        .post("/taxonomy_contains", json!({"note": "dangling"}))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("_from"));
}

#[tokio::test]
async fn replace_resets_absent_fields() {
    let client = spawn_server().await;
    let created: Value = client
        .post("/nodes", json!({"name": "Animal", "rank": "kingdom"}))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let key = created["_key"].as_str().unwrap();

    let resp = client
        .put(&format!("/nodes/{}", key), json!({"name": "Plant"}))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let replaced: Value = resp.json().await.unwrap();
    assert_eq!(replaced["name"], "Plant");
    assert_ne!(replaced["_rev"], created["_rev"]);

    let fetched: Value = client
        .get(&format!("/nodes/{}", key))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched["name"], "Plant");
    assert!(fetched.get("rank").is_none());
}

#[tokio::test]
async fn replace_on_edge_persists_endpoints() {
    let client = spawn_server().await;
    let created: Value = client
        .post(
            "/edges",
            json!({"_from": "nodes/1", "_to": "nodes/2", "label": "is_a"}),
        )
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let key = created["_key"].as_str().unwrap();

    let resp = client
        .put(&format!("/edges/{}", key), json!({"label": "part_of"}))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let fetched: Value = client
        .get(&format!("/edges/{}", key))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched["label"], "part_of");
    assert_eq!(fetched["_from"], "nodes/1");
    assert_eq!(fetched["_to"], "nodes/2");
}

#[tokio::test]
async fn patch_merges_provided_fields_only() {
    let client = spawn_server().await;
    let created: Value = client
        .post("/fields", json!({"name": "age", "type": "int"}))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let key = created["_key"].as_str().unwrap();

    let resp = client
        .patch(&format!("/fields/{}", key), json!({"type": "string"}))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let patched: Value = resp.json().await.unwrap();
    assert_eq!(patched["name"], "age");
    assert_eq!(patched["type"], "string");
}

#[tokio::test]
async fn duplicate_supplied_key_is_a_conflict() {
    let client = spawn_server().await;
    let resp = client
        .post("/node_types", json!({"_key": "species", "name": "species"}))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = client
        .post("/node_types", json!({"_key": "species", "name": "dup"}))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn stale_revision_replace_is_a_conflict() {
    let client = spawn_server().await;
    let created: Value = client
        .post("/nodes", json!({"name": "Animal"}))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let key = created["_key"].as_str().unwrap();
    let old_rev = created["_rev"].as_str().unwrap();

    let resp = client
        .put(&format!("/nodes/{}", key), json!({"name": "Plant"}))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .put(
            &format!("/nodes/{}", key),
            json!({"name": "Fungus", "_rev": old_rev}),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn unknown_keys_yield_404_on_every_verb() {
    let client = spawn_server().await;

    let resp = client.get("/taxonomy/unknown").await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = client.put("/taxonomy/unknown", json!({"name": "x"})).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = client
        .patch("/taxonomy/unknown", json!({"name": "x"}))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = client.delete("/taxonomy/unknown").await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_is_final() {
    let client = spawn_server().await;
    let created: Value = client
        .post("/has_field", json!({"_from": "node_types/1", "_to": "fields/1"}))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let key = created["_key"].as_str().unwrap();

    let resp = client.delete(&format!("/has_field/{}", key)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = client.get(&format!("/has_field/{}", key)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_shapes_are_rejected() {
    let client = spawn_server().await;

    let resp = client.post("/nodes", json!(["not", "an", "object"])).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = client
        .post("/nodes", json!({"_from": "nodes/1", "name": "bad"}))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = client.post("/fields", json!({"_key": 42})).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
