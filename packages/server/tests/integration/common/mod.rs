use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use common::cache::memory::MemoryCache;
use common::config::{CacheConfig, StorageConfig};
use common::storage::filesystem::FilesystemBlobStore;
use reqwest::Client;
use sea_orm::{DatabaseConnection, EntityTrait};
use serde_json::Value;
use tempfile::TempDir;

use textvault::config::{
    AppConfig, AuthConfig, CorsConfig, DatabaseConfig, PasteConfig, ServerConfig,
};
use textvault::entity::paste;
use textvault::paste::{PasteService, PasteServiceContext, SeaOrmMetadataStore};
use textvault::state::AppState;
use textvault::utils::jwt::JwtKeys;

pub const JWT_SECRET: &str = "test-secret-for-integration-tests";
pub const MAX_BLOB_SIZE: u64 = 64 * 1024;

pub mod routes {
    pub const SAVE: &str = "/api/v1/paste/save";
    pub const REGISTER: &str = "/api/v1/user/register";
    pub const LOGIN: &str = "/api/v1/user/login";
    pub const VALIDATE: &str = "/api/v1/user/validate";
    pub const MY_PASTES: &str = "/api/v1/user/pastes";
    pub const HEALTH: &str = "/health";
    pub const OPENAPI: &str = "/api-docs/openapi.json";

    pub fn get(hash: &str) -> String {
        format!("/api/v1/paste/get/{hash}")
    }

    pub fn delete(hash: &str) -> String {
        format!("/api/v1/paste/delete/{hash}")
    }
}

/// A running test server backed by SQLite, a filesystem blob store and an
/// in-process cache, all inside a private temp directory.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub db: DatabaseConnection,
    pub cache: Option<Arc<MemoryCache>>,
    blob_dir: PathBuf,
    _dir: TempDir,
}

/// Parsed HTTP response for test assertions.
pub struct TestResponse {
    pub status: u16,
    /// Raw response body as text.
    pub text: String,
    /// Parsed JSON body, or `Null` if the response is not valid JSON.
    pub body: Value,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::start(true).await
    }

    pub async fn spawn_without_cache() -> Self {
        Self::start(false).await
    }

    async fn start(with_cache: bool) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let blob_dir = dir.path().join("blobs");
        let db_url = format!("sqlite://{}?mode=rwc", dir.path().join("textvault.db").display());

        let mut database = DatabaseConfig::new(&db_url);
        database.max_connections = 1;
        database.min_connections = 1;

        let app_config = AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors: CorsConfig::default(),
            },
            database,
            auth: AuthConfig {
                jwt_secret: JWT_SECRET.to_string(),
                token_ttl_hours: 24,
            },
            storage: StorageConfig {
                path: blob_dir.clone(),
                max_blob_size: MAX_BLOB_SIZE,
                ..Default::default()
            },
            cache: CacheConfig::default(),
            paste: PasteConfig::default(),
        };

        let db = textvault::database::init_db(&app_config.database)
            .await
            .expect("Failed to initialize test database");

        let blobs = FilesystemBlobStore::new(blob_dir.clone(), MAX_BLOB_SIZE)
            .await
            .expect("Failed to create blob store");
        let jwt = Arc::new(JwtKeys::new(JWT_SECRET, app_config.auth.token_ttl().unwrap()));

        let mut pastes = PasteService::new(
            PasteServiceContext::default(),
            Arc::new(SeaOrmMetadataStore::new(db.clone())),
            Arc::new(blobs),
            jwt.clone(),
        );
        let cache = with_cache.then(|| Arc::new(MemoryCache::new(1024)));
        if let Some(cache) = &cache {
            pastes = pastes.with_cache(cache.clone());
        }

        let state = AppState {
            db: db.clone(),
            config: Arc::new(app_config),
            pastes: Arc::new(pastes),
            jwt,
        };

        let app = textvault::build_router(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            client: Client::new(),
            db,
            cache,
            blob_dir,
            _dir: dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn post_with_token(&self, path: &str, body: &Value, token: &str) -> TestResponse {
        let res = self
            .client
            .post(self.url(path))
            .header("Authorization", format!("Bearer {token}"))
            .json(body)
            .send()
            .await
            .expect("Failed to send POST request");

        TestResponse::from_response(res).await
    }

    pub async fn post_without_token(&self, path: &str, body: &Value) -> TestResponse {
        let res = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to send POST request");

        TestResponse::from_response(res).await
    }

    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        let res = self
            .client
            .post(self.url(path))
            .header("Content-Type", "application/json")
            .body(body.to_string())
            .send()
            .await
            .expect("Failed to send POST request");

        TestResponse::from_response(res).await
    }

    pub async fn get_with_token(&self, path: &str, token: &str) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .header("Authorization", format!("Bearer {token}"))
            .send()
            .await
            .expect("Failed to send GET request");

        TestResponse::from_response(res).await
    }

    pub async fn get_without_token(&self, path: &str) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to send GET request");

        TestResponse::from_response(res).await
    }

    pub async fn delete_with_token(&self, path: &str, token: &str) -> TestResponse {
        let res = self
            .client
            .delete(self.url(path))
            .header("Authorization", format!("Bearer {token}"))
            .send()
            .await
            .expect("Failed to send DELETE request");

        TestResponse::from_response(res).await
    }

    pub async fn delete_with_header(&self, path: &str, header: Option<&str>) -> TestResponse {
        let mut req = self.client.delete(self.url(path));
        if let Some(value) = header {
            req = req.header("Authorization", value);
        }
        let res = req.send().await.expect("Failed to send DELETE request");

        TestResponse::from_response(res).await
    }

    /// Register a user and log in, returning the auth token.
    pub async fn create_authenticated_user(&self, username: &str, password: &str) -> String {
        let reg = self
            .post_without_token(
                routes::REGISTER,
                &serde_json::json!({
                    "u": username,
                    "m": format!("{username}@example.com"),
                    "p": password,
                }),
            )
            .await;
        assert_eq!(reg.status, 200, "Registration failed: {}", reg.text);

        let res = self
            .post_without_token(
                routes::LOGIN,
                &serde_json::json!({"u": username, "p": password}),
            )
            .await;
        assert_eq!(res.status, 200, "Login failed: {}", res.text);

        res.body["token"]
            .as_str()
            .expect("Login response should contain a token")
            .to_string()
    }

    /// Save a paste via the API and return its `hash`.
    pub async fn save_paste(&self, token: Option<&str>, content: &str) -> String {
        let body = serde_json::json!({
            "title": "snippet",
            "language": "rust",
            "content": content,
        });
        let res = match token {
            Some(token) => self.post_with_token(routes::SAVE, &body, token).await,
            None => self.post_without_token(routes::SAVE, &body).await,
        };
        assert_eq!(res.status, 200, "save_paste failed: {}", res.text);
        res.body["hash"]
            .as_str()
            .expect("Save response should contain a hash")
            .to_string()
    }

    /// Metadata row for a paste, straight from the database.
    pub async fn paste_row(&self, hash: &str) -> Option<paste::Model> {
        paste::Entity::find_by_id(hash.to_string())
            .one(&self.db)
            .await
            .expect("DB query failed")
    }

    /// On-disk location of a paste's content.
    pub fn blob_path(&self, hash: &str) -> PathBuf {
        self.blob_dir.join(&hash[..2]).join(&hash[2..])
    }
}

impl TestResponse {
    pub async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status().as_u16();
        let text = res.text().await.unwrap_or_default();
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        Self { status, text, body }
    }
}
