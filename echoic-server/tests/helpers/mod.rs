//! Shared fixtures for echoic-server integration tests
//!
//! Each test gets its own temporary root folder (database, uploads,
//! recordings) and a router wired to a `FixedRecognizer`.

#![allow(dead_code)]

pub mod audio_fixtures;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot` method

use echoic_common::config::RootFolderInitializer;
use echoic_server::services::{FixedRecognizer, PronunciationPipeline, RecognizerConfig};
use echoic_server::{build_router, AppState};

pub const TEST_PASSWORD: &str = "secret123";

pub struct TestApp {
    /// Keeps the root folder alive for the test's duration
    pub root: TempDir,
    pub state: AppState,
    pub router: Router,
    pub recognizer: Arc<FixedRecognizer>,
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        (status, extract_json(response.into_body()).await)
    }

    pub async fn send_raw(&self, request: Request<Body>) -> axum::response::Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub fn recordings(&self) -> Vec<String> {
        list_dir(&self.state.recordings_dir)
    }

    pub fn uploads(&self) -> Vec<String> {
        list_dir(&self.state.uploads_dir)
    }
}

/// Build an app over a fresh root folder
pub async fn setup_app(recognizer: FixedRecognizer) -> TestApp {
    setup_app_with_limit(recognizer, 16 * 1024 * 1024).await
}

pub async fn setup_app_with_limit(recognizer: FixedRecognizer, max_upload_bytes: usize) -> TestApp {
    let root = tempfile::tempdir().unwrap();
    let initializer = RootFolderInitializer::new(root.path().to_path_buf());
    initializer.ensure_directory_exists().unwrap();

    let db = echoic_common::db::init_database(&initializer.database_path())
        .await
        .unwrap();

    let recognizer = Arc::new(recognizer);
    let pipeline = PronunciationPipeline::new(recognizer.clone(), &RecognizerConfig::default());
    let state = AppState::new(
        db,
        pipeline,
        initializer.uploads_path(),
        initializer.recordings_path(),
        max_upload_bytes,
    );

    TestApp {
        root,
        router: build_router(state.clone()),
        state,
        recognizer,
    }
}

pub async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
}

fn list_dir(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

// =============================================================================
// Requests
// =============================================================================

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    empty_request("GET", uri, token)
}

pub fn empty_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

/// Minimal multipart/form-data encoder
pub struct MultipartBuilder {
    boundary: String,
    body: Vec<u8>,
}

impl MultipartBuilder {
    pub fn new() -> Self {
        Self {
            boundary: "echoic-test-boundary-7d93".to_string(),
            body: Vec::new(),
        }
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                self.boundary, name, value
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, filename: &str, content_type: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                self.boundary, name, filename, content_type
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn into_request(mut self, uri: &str, token: Option<&str>) -> Request<Body> {
        self.body
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());

        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", self.boundary),
            );
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(Body::from(self.body)).unwrap()
    }
}

// =============================================================================
// Accounts and songs
// =============================================================================

pub async fn register(app: &TestApp, username: &str) -> (StatusCode, Value) {
    app.send(json_request(
        "POST",
        "/api/register",
        None,
        json!({
            "username": username,
            "email": format!("{}@example.com", username),
            "password": TEST_PASSWORD,
            "confirm_password": TEST_PASSWORD,
        }),
    ))
    .await
}

/// Register a user and return a session token
pub async fn login_new_user(app: &TestApp, username: &str) -> String {
    let (status, _) = register(app, username).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app
        .send(json_request(
            "POST",
            "/api/login",
            None,
            json!({ "username": username, "password": TEST_PASSWORD }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

/// Create a song without audio; returns its id
pub async fn create_song(app: &TestApp, token: &str, title: &str, lyrics: &str) -> String {
    let request = MultipartBuilder::new()
        .text("title", title)
        .text("lyrics", lyrics)
        .into_request("/api/songs", Some(token));
    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::CREATED, "create song failed: {}", body);
    body["guid"].as_str().unwrap().to_string()
}

pub async fn evaluate(
    app: &TestApp,
    token: &str,
    song_id: &str,
    line_number: i64,
    expected_text: &str,
    audio: &[u8],
) -> (StatusCode, Value) {
    let request = MultipartBuilder::new()
        .text("song_id", song_id)
        .text("line_number", &line_number.to_string())
        .text("expected_text", expected_text)
        .file("audio", "recording.wav", "audio/wav", audio)
        .into_request("/api/evaluate", Some(token));
    app.send(request).await
}

// =============================================================================
// Audio fixtures
// =============================================================================

/// 16-bit mono WAV tone, in memory
pub fn tone_wav_bytes(sample_rate: u32, duration_seconds: f64) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        let total_samples = (duration_seconds * sample_rate as f64) as usize;
        for i in 0..total_samples {
            let t = i as f64 / sample_rate as f64;
            let sample = (t * 440.0 * 2.0 * std::f64::consts::PI).sin() * 0.3;
            writer.write_sample((sample * i16::MAX as f64) as i16).unwrap();
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}

/// Write a tone WAV to disk
pub fn write_tone_wav(path: &Path, sample_rate: u32, duration_seconds: f64) {
    std::fs::write(path, tone_wav_bytes(sample_rate, duration_seconds)).unwrap();
}
