use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::{Value, json};

use stockroom_infra::{AppConfig, InMemoryRepository};

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod over in-memory storage, bound to an ephemeral port.
        let config = AppConfig::in_memory("test-secret");
        let app = stockroom_api::app::build_router(Arc::new(InMemoryRepository::new()), &config);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            client: reqwest::Client::new(),
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get(&self, token: &str, path: &str) -> (StatusCode, Value) {
        let res = self.client.get(self.url(path)).bearer_auth(token).send().await.unwrap();
        let status = res.status();
        (status, res.json().await.unwrap_or(Value::Null))
    }

    async fn post(&self, token: &str, path: &str, body: Value) -> (StatusCode, Value) {
        let res = self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = res.status();
        (status, res.json().await.unwrap_or(Value::Null))
    }

    /// Sign up, log in and open a store; returns the bearer token.
    async fn onboard(&self, username: &str) -> String {
        let token = self.login_new_user(username).await;
        let (status, _) = self.post(&token, "/stores", json!({ "name": "store1" })).await;
        assert_eq!(status, StatusCode::CREATED);
        token
    }

    async fn login_new_user(&self, username: &str) -> String {
        let res = self
            .client
            .post(self.url("/signup"))
            .json(&json!({
                "username": username,
                "password": "password123",
                "repassword": "password123",
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = res.json().await.unwrap();
        assert_eq!(body["messages"], "Account created successfully");

        let res = self
            .client
            .post(self.url("/login"))
            .json(&json!({ "username": username, "password": "password123" }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = res.json().await.unwrap();
        body["token"].as_str().unwrap().to_string()
    }

    async fn material(&self, token: &str, name: &str, max: i64, current: i64) -> i64 {
        let (status, body) = self
            .post(
                token,
                "/material",
                json!({
                    "name": name,
                    "price": "12.50",
                    "max_capacity": max,
                    "current_capacity": current,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["id"].as_i64().unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[tokio::test]
async fn health_is_public_and_catalog_requires_auth() {
    let srv = TestServer::spawn().await;

    let res = srv.client.get(srv.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = srv.client.get(srv.url("/material")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = srv
        .client
        .get(srv.url("/material"))
        .bearer_auth("not-a-jwt")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn wrong_password_is_rejected() {
    let srv = TestServer::spawn().await;
    srv.login_new_user("admin").await;

    let res = srv
        .client
        .post(srv.url("/login"))
        .json(&json!({ "username": "admin", "password": "nope" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn catalog_needs_a_store() {
    let srv = TestServer::spawn().await;
    let token = srv.login_new_user("admin").await;

    let (status, body) = srv.get(&token, "/material").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "store_not_found");

    srv.post(&token, "/stores", json!({ "name": "store1" })).await;
    let (status, body) = srv.post(&token, "/stores", json!({ "name": "store2" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["error_messages"], "User already created a store!");
}

#[tokio::test]
async fn duplicate_material_is_a_soft_error() {
    let srv = TestServer::spawn().await;
    let token = srv.onboard("admin").await;
    srv.material(&token, "material1", 100, 0).await;

    let (status, body) = srv
        .post(&token, "/material", json!({ "name": "material1", "price": "1.00" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["error_messages"], "Material existed!");
}

#[tokio::test]
async fn restock_read_and_write() {
    let srv = TestServer::spawn().await;
    let token = srv.onboard("admin").await;

    let (_, body) = srv.get(&token, "/material/restock").await;
    assert_eq!(body["materials"], json!([]));
    assert_eq!(body["total_price"], "0.00");
    assert_eq!(body["messages"], "Nothing to restock!");

    let full = srv.material(&token, "full", 100, 100).await;
    let low = srv.material(&token, "low", 100, 48).await;

    let (status, body) = srv.get(&token, "/material/restock").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["materials"], json!([{ "id": low, "quantity": 52 }]));
    assert_eq!(body["total_price"], "650.00");

    // One bad line rejects the batch.
    let (status, body) = srv
        .post(
            &token,
            "/material/restock",
            json!({ "materials": [{ "id": low, "quantity": 10 }, { "id": full, "quantity": 1 }] }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["error_messages"], "Invalid restock quantity");
    let (_, low_body) = srv.get(&token, &format!("/material/{low}")).await;
    assert_eq!(low_body["current_capacity"], 48);

    let (status, body) = srv
        .post(
            &token,
            "/material/restock",
            json!({ "materials": [{ "id": low, "quantity": 52 }], "total_price": "650.00" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Restock successfully");

    let (_, body) = srv.get(&token, "/material/inventory").await;
    let levels = body.as_array().unwrap();
    assert_eq!(levels.len(), 2);
    assert!(levels.iter().all(|l| l["percentage_of_capacity"] == json!(1.0)));
}

#[tokio::test]
async fn inventory_with_unbounded_material_is_a_computation_error() {
    let srv = TestServer::spawn().await;
    let token = srv.onboard("admin").await;
    srv.material(&token, "unbounded", 0, 0).await;

    let (status, body) = srv.get(&token, "/material/inventory").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "computation_error");
}

#[tokio::test]
async fn sale_depletes_materials_through_the_recipe() {
    let srv = TestServer::spawn().await;
    let token = srv.onboard("admin").await;

    let a = srv.material(&token, "a", 100, 100).await;
    let b = srv.material(&token, "b", 100, 51).await;
    let (_, product) = srv.post(&token, "/product", json!({ "name": "product1" })).await;
    let p = product["id"].as_i64().unwrap();

    for (material, quantity) in [(a, 10), (b, 6)] {
        let (status, _) = srv
            .post(
                &token,
                "/material-quantity",
                json!({ "product_id": p, "material_id": material, "quantity": quantity }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, body) = srv.get(&token, "/product/product-capacity").await;
    assert_eq!(body["remaining_capacities"], json!([{ "product": p, "quantity": 8 }]));

    let (status, body) = srv
        .post(&token, "/product/sale", json!({ "sale": [{ "product": p, "quantity": 5 }] }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Sale Successfully");

    let (_, body) = srv.get(&token, &format!("/material/{a}")).await;
    assert_eq!(body["current_capacity"], 50);
    let (_, body) = srv.get(&token, &format!("/material/{b}")).await;
    assert_eq!(body["current_capacity"], 21);

    let (status, body) = srv
        .post(&token, "/product/sale", json!({ "sale": [{ "product": p, "quantity": 500 }] }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.get("error_messages").is_some());
    let (_, body) = srv.get(&token, &format!("/material/{a}")).await;
    assert_eq!(body["current_capacity"], 50);
}

#[tokio::test]
async fn stores_cannot_see_each_other() {
    let srv = TestServer::spawn().await;
    let alice = srv.onboard("alice").await;
    let bob = srv.onboard("bob").await;

    let m = srv.material(&alice, "secret", 10, 0).await;

    let (status, _) = srv.get(&bob, &format!("/material/{m}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = srv
        .post(&bob, "/material/restock", json!({ "materials": [{ "id": m, "quantity": 1 }] }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["error_messages"], "Material doesn't exists!");
}
