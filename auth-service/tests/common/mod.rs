use std::sync::Arc;
use std::time::Duration as StdDuration;

use auth::TokenCodec;
use auth_service::domain::identity::models::AccountStatus;
use auth_service::domain::identity::ports::IdentityRepository;
use auth_service::domain::identity::service::AuthService;
use auth_service::domain::identity::service::AuthSettings;
use auth_service::inbound::http::router::create_router;
use auth_service::outbound::repositories::InMemoryIdentityRepository;
use auth_service::outbound::revocation::InMemoryRevocationStore;
use chrono::Duration;
use serde_json::json;
use serde_json::Value;

pub const JWT_SECRET: &str = "test-secret-key-for-jwt-signing-at-least-32-bytes";
pub const PASSWORD: &str = "Valid123x";

pub fn settings() -> AuthSettings {
    AuthSettings {
        jwt_secret: JWT_SECRET.to_string(),
        issuer: "AlgoCollab".to_string(),
        access_token_ttl: Duration::hours(1),
        refresh_token_ttl: Duration::days(7),
        store_timeout: StdDuration::from_secs(2),
    }
}

/// Test application that spawns a real server over in-memory stores
pub struct TestApp {
    pub address: String,
    pub api_client: reqwest::Client,
    pub identities: Arc<InMemoryIdentityRepository>,
    pub revocations: Arc<InMemoryRevocationStore>,
    pub tokens: TokenCodec,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let identities = Arc::new(InMemoryIdentityRepository::new());
        let revocations = Arc::new(InMemoryRevocationStore::new());
        let auth_service = Arc::new(AuthService::new(
            Arc::clone(&identities),
            Arc::clone(&revocations),
            settings(),
        ));

        let router = create_router(auth_service, StdDuration::from_secs(5));

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            api_client: reqwest::Client::new(),
            identities,
            revocations,
            tokens: TokenCodec::new(JWT_SECRET.as_bytes()),
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Helper to make POST request with Bearer token
    pub fn post_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.post(path).bearer_auth(token)
    }

    /// Register an identity and return the response body
    pub async fn register(&self, username: &str, email: &str) -> Value {
        let response = self
            .post("/api/v1/auth/register")
            .json(&json!({
                "username": username,
                "email": email,
                "password": PASSWORD
            }))
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(response.status(), reqwest::StatusCode::CREATED);
        response.json().await.expect("Failed to parse response")
    }

    /// Change the status of a stored identity
    pub async fn set_status(&self, email: &str, status: AccountStatus) {
        let mut identity = self
            .identities
            .find_by_email(email)
            .await
            .unwrap()
            .expect("Identity not found");
        identity.status = status;
        self.identities.update(identity).await.unwrap();
    }
}
