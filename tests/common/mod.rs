use std::sync::{Arc, Once};

use docflow_service::config::{
    AppConfig, AuthConfig, CorsConfig, MongoConfig, ServerConfig, StorageConfig,
    SummarizerConfig, SummarizerProvider,
};
use docflow_service::middleware::auth::issue_token;
use docflow_service::models::{Role, User};
use docflow_service::services::metrics::init_metrics;
use docflow_service::services::{LocalStorage, MockSummarizer, Storage, Summarizer};
use docflow_service::startup::Application;
use docflow_service::store::{MemoryStore, Store};
use reqwest::header;
use serde_json::Value;

pub const JWT_SECRET: &str = "test-secret";

static METRICS: Once = Once::new();

pub struct TestApp {
    pub address: String,
    pub store: Arc<MemoryStore>,
    pub summarizer: Arc<MockSummarizer>,
    pub storage_path: String,
    pub client: reqwest::Client,
}

impl TestApp {
    pub async fn spawn() -> Self {
        METRICS.call_once(init_metrics);

        let storage_path = format!("target/test-storage-{}", uuid::Uuid::new_v4());
        let config = AppConfig {
            server: ServerConfig { port: 0 },
            mongodb: MongoConfig {
                // Unused: the test app runs on the in-memory store.
                uri: "mongodb://localhost:27017".to_string(),
                database: "unused".to_string(),
            },
            storage: StorageConfig {
                local_path: storage_path.clone(),
                quota_bytes: 100 * 1024 * 1024,
            },
            auth: AuthConfig {
                jwt_secret: JWT_SECRET.to_string(),
            },
            summarizer: SummarizerConfig {
                provider: SummarizerProvider::Mock,
                api_url: String::new(),
                api_token: None,
            },
            cors: CorsConfig {
                allowed_origins: vec!["http://localhost:5173".to_string()],
            },
        };

        let store = Arc::new(MemoryStore::new());
        let storage: Arc<dyn Storage> = Arc::new(
            LocalStorage::new(&storage_path)
                .await
                .expect("Failed to create test storage"),
        );
        let summarizer = Arc::new(MockSummarizer::new(true));

        let app = Application::with_store(
            config,
            store.clone(),
            storage,
            summarizer.clone() as Arc<dyn Summarizer>,
        )
        .await
        .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            store,
            summarizer,
            storage_path,
            client,
        }
    }

    /// Inserts a user and returns it with a matching `token=` cookie value.
    pub async fn seed_user(&self, role: Role) -> (User, String) {
        let user = User::new(
            format!("{}-{}@example.com", role, uuid::Uuid::new_v4()),
            role,
        );
        self.store
            .insert_user(&user)
            .await
            .expect("Failed to seed user");
        let token = issue_token(JWT_SECRET, &user.id, role, 1).expect("Failed to mint token");
        (user, format!("token={}", token))
    }

    pub async fn get(&self, path: &str, cookie: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{}", self.address, path))
            .header(header::COOKIE, cookie)
            .send()
            .await
            .expect("Request failed")
    }

    pub async fn post_json(&self, path: &str, cookie: &str, body: &Value) -> reqwest::Response {
        self.client
            .post(format!("{}{}", self.address, path))
            .header(header::COOKIE, cookie)
            .json(body)
            .send()
            .await
            .expect("Request failed")
    }

    pub async fn put_json(&self, path: &str, cookie: &str, body: &Value) -> reqwest::Response {
        self.client
            .put(format!("{}{}", self.address, path))
            .header(header::COOKIE, cookie)
            .json(body)
            .send()
            .await
            .expect("Request failed")
    }

    pub async fn delete(&self, path: &str, cookie: &str) -> reqwest::Response {
        self.client
            .delete(format!("{}{}", self.address, path))
            .header(header::COOKIE, cookie)
            .send()
            .await
            .expect("Request failed")
    }

    pub async fn upload(
        &self,
        cookie: &str,
        filename: &str,
        mimetype: &str,
        bytes: Vec<u8>,
        folder_id: Option<&str>,
    ) -> reqwest::Response {
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str(mimetype)
            .expect("Invalid mimetype");
        let mut form = reqwest::multipart::Form::new().part("file", part);
        if let Some(folder_id) = folder_id {
            form = form.text("folderId", folder_id.to_string());
        }
        self.client
            .post(format!("{}/api/documents/upload", self.address))
            .header(header::COOKIE, cookie)
            .multipart(form)
            .send()
            .await
            .expect("Upload request failed")
    }

    /// Convenience: upload a plain-text document and return its JSON body.
    pub async fn upload_text(&self, cookie: &str, filename: &str, text: &str) -> Value {
        let response = self
            .upload(cookie, filename, "text/plain", text.as_bytes().to_vec(), None)
            .await;
        assert_eq!(response.status(), 201);
        response.json().await.expect("Invalid upload response")
    }

    pub async fn cleanup(&self) {
        let _ = tokio::fs::remove_dir_all(&self.storage_path).await;
    }
}
