#![allow(dead_code)]

use reqwest::{RequestBuilder, Response};
use serde_json::{json, Value};
use std::net::TcpListener;
use student_records::auth::{PasswordHasher, MIN_BCRYPT_COST};
use student_records::configuration::JwtSettings;
use student_records::services::AppServices;
use student_records::startup::run;
use student_records::store::MemoryStore;

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "adminpass1";

pub struct TestApp {
    pub address: String,
    pub store: MemoryStore,
    pub jwt: JwtSettings,
    pub client: reqwest::Client,
}

pub fn jwt_settings() -> JwtSettings {
    JwtSettings {
        secret: "integration-test-secret-at-least-32-chars".to_string(),
        expiry_seconds: 600,
        issuer: "student_records_test".to_string(),
    }
}

/// Starts the server on a random port over an in-memory store with one
/// seeded admin.
pub async fn spawn_app() -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let store = MemoryStore::new();
    let jwt = jwt_settings();
    let hasher = PasswordHasher::new(MIN_BCRYPT_COST).expect("Failed to build hasher");
    let services = AppServices::new(store.clone(), hasher, jwt.clone());

    services
        .admins
        .seed_initial_admin(ADMIN_USERNAME, ADMIN_PASSWORD)
        .await
        .expect("Failed to seed admin");

    let server = run(listener, services, vec![]).expect("Failed to bind address");
    let _ = tokio::spawn(server);

    TestApp {
        address,
        store,
        jwt,
        client: reqwest::Client::new(),
    }
}

pub fn student_body(nim: &str) -> Value {
    json!({
        "nim": nim,
        "name": "A",
        "password_plain": "password1",
        "dob": "2000-01-01"
    })
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub fn get(&self, path: &str) -> RequestBuilder {
        self.client.get(self.url(path))
    }

    pub fn post(&self, path: &str) -> RequestBuilder {
        self.client.post(self.url(path))
    }

    pub fn put(&self, path: &str) -> RequestBuilder {
        self.client.put(self.url(path))
    }

    pub fn delete(&self, path: &str) -> RequestBuilder {
        self.client.delete(self.url(path))
    }

    pub async fn register(&self, body: &Value) -> Response {
        self.post("/auth/register")
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn student_login(&self, nim: &str, password: &str) -> Response {
        self.post("/auth/student/login")
            .json(&json!({ "nim": nim, "password": password }))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    /// Registers a student and returns the access token
    pub async fn student_token(&self, nim: &str) -> String {
        let response = self.register(&student_body(nim)).await;
        assert_eq!(201, response.status().as_u16());
        access_token(response).await
    }

    pub async fn admin_token(&self) -> String {
        let response = self
            .post("/auth/admin/login")
            .json(&json!({ "username": ADMIN_USERNAME, "password": ADMIN_PASSWORD }))
            .send()
            .await
            .expect("Failed to execute request.");
        assert_eq!(200, response.status().as_u16());
        access_token(response).await
    }
}

pub async fn access_token(response: Response) -> String {
    let body: Value = response.json().await.expect("Failed to parse response");
    body["access_token"]
        .as_str()
        .expect("Missing access_token")
        .to_string()
}
