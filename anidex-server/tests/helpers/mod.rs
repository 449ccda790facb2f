//! Shared fixtures for anidex-server integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    extract::{Query, State},
    http::{HeaderMap, Request, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use http_body_util::BodyExt;
use serde_json::json;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tempfile::TempDir;

use anidex_common::SpeciesRecord;
use anidex_server::classifier::{Classification, ImageClassifier};
use anidex_server::pipeline::{RequestOrigin, UploadPipeline};
use anidex_server::services::{AnimalIdentifier, LookupOutcome, SpeciesLookup};
use anidex_server::storage::MediaStore;
use anidex_server::AppState;

pub const TEST_HOST: &str = "testserver:8000";
pub const TEST_API_KEY: &str = "test-key";
const BOUNDARY: &str = "anidex-test-boundary";

/// Classifier that always returns the same outcome
pub struct StubClassifier(pub Classification);

impl StubClassifier {
    pub fn label(label: &str) -> Arc<dyn ImageClassifier> {
        Arc::new(Self(Classification::Label(label.to_string())))
    }

    pub fn unavailable() -> Arc<dyn ImageClassifier> {
        Arc::new(Self(Classification::Unavailable {
            reason: "cannot identify image".to_string(),
        }))
    }
}

impl ImageClassifier for StubClassifier {
    fn classify(&self, _image_bytes: &[u8]) -> Classification {
        self.0.clone()
    }
}

/// In-memory species table keyed by lower-cased name
#[derive(Default)]
pub struct StubLookup {
    records: HashMap<String, SpeciesRecord>,
}

impl StubLookup {
    pub fn with(mut self, name: &str, record: SpeciesRecord) -> Self {
        self.records.insert(name.to_lowercase(), record);
        self
    }

    pub fn into_arc(self) -> Arc<dyn SpeciesLookup> {
        Arc::new(self)
    }
}

#[async_trait]
impl SpeciesLookup for StubLookup {
    async fn lookup(&self, name: &str) -> LookupOutcome {
        match self.records.get(&name.to_lowercase()) {
            Some(record) => LookupOutcome::Found(record.clone()),
            None => LookupOutcome::NotFound,
        }
    }
}

/// Species payload shaped like the external service response
pub fn tiger_json() -> serde_json::Value {
    json!({
        "name": "Tiger",
        "taxonomy": {
            "kingdom": "Animalia",
            "family": "Felidae",
            "scientific_name": "Panthera tigris"
        },
        "locations": ["Asia"],
        "characteristics": {
            "habitat": "Tropical rainforest",
            "diet": "Carnivore",
            "lifespan": "10 - 15 years",
            "weight": "90kg - 310kg",
            "top_speed": "65 km/h",
            "slogan": "The largest feline in the world!",
            "color": "Orange"
        }
    })
}

pub fn tiger_record() -> SpeciesRecord {
    serde_json::from_value(tiger_json()).unwrap()
}

/// Router plus handles to its backing stores
pub struct TestApp {
    pub router: Router,
    pub pool: SqlitePool,
    pub media_dir: TempDir,
}

pub async fn memory_pool() -> SqlitePool {
    // One connection so every query sees the same in-memory database
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");
    anidex_server::db::init_tables(&pool)
        .await
        .expect("Failed to initialize schema");
    pool
}

pub async fn create_test_app(
    classifier: Arc<dyn ImageClassifier>,
    lookup: Arc<dyn SpeciesLookup>,
    record_uploads: bool,
) -> TestApp {
    create_test_app_with(classifier, lookup, record_uploads, |state| state).await
}

/// Like [`create_test_app`], with a hook to adjust the state before routing
pub async fn create_test_app_with(
    classifier: Arc<dyn ImageClassifier>,
    lookup: Arc<dyn SpeciesLookup>,
    record_uploads: bool,
    configure: impl FnOnce(AppState) -> AppState,
) -> TestApp {
    let pool = memory_pool().await;
    let media_dir = tempfile::tempdir().expect("Failed to create temp dir");

    let mut pipeline = UploadPipeline::new(
        AnimalIdentifier::new(classifier, lookup),
        MediaStore::new(media_dir.path()),
    );
    if record_uploads {
        pipeline = pipeline.with_records(pool.clone());
    }

    let state = AppState::new(
        pipeline,
        pool.clone(),
        media_dir.path().to_path_buf(),
        RequestOrigin::new("http", "127.0.0.1:8000"),
    );

    TestApp {
        router: anidex_server::build_router(configure(state)),
        pool,
        media_dir,
    }
}

/// Multipart upload with a single file field
pub fn upload_request(field: &str, file_name: Option<&str>, bytes: &[u8]) -> Request<Body> {
    let disposition = match file_name {
        Some(name) => format!("form-data; name=\"{}\"; filename=\"{}\"", field, name),
        None => format!("form-data; name=\"{}\"", field),
    };

    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(format!("Content-Disposition: {}\r\n", disposition).as_bytes());
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/anidex/upload/")
        .header("host", TEST_HOST)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("host", TEST_HOST)
        .body(Body::empty())
        .unwrap()
}

pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

/// Files stored under `<media>/animals/`
pub fn stored_files(media_dir: &TempDir) -> Vec<std::path::PathBuf> {
    match std::fs::read_dir(media_dir.path().join("animals")) {
        Ok(entries) => entries.filter_map(|e| e.ok()).map(|e| e.path()).collect(),
        Err(_) => Vec::new(),
    }
}

/// One request received by the species mock
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub name: Option<String>,
    pub api_key: Option<String>,
}

#[derive(Clone)]
struct MockState {
    status: StatusCode,
    body: serde_json::Value,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
}

async fn mock_animals(
    State(state): State<MockState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    state.seen.lock().unwrap().push(SeenRequest {
        name: params.get("name").cloned(),
        api_key: headers
            .get("x-api-key")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    });
    (state.status, Json(state.body.clone()))
}

/// Species service stand-in on an ephemeral port
///
/// Returns the endpoint URL and the log of received requests.
pub async fn spawn_species_mock(
    status: StatusCode,
    body: serde_json::Value,
) -> (String, Arc<Mutex<Vec<SeenRequest>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/v1/animals", get(mock_animals))
        .with_state(MockState {
            status,
            body,
            seen: Arc::clone(&seen),
        });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}/v1/animals", addr), seen)
}
