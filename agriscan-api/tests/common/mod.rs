//! Common test utilities for integration tests
//!
//! This module provides shared infrastructure for integration tests:
//! - In-memory SQLite database with migrations applied
//! - A fake inference model with fixed scores
//! - Fake chat clients (echoing and failing)
//! - Request, cookie and multipart helpers

#![allow(dead_code)]

use agriscan_api::app::{build_router, AppState};
use agriscan_api::config::Config;
use agriscan_shared::classifier::{
    ClassifierError, ImageClassifier, InferenceModel, InputSpec, ResizeFilter, TensorLayout,
};
use agriscan_shared::clients::{ChatClient, ExternalServiceError};
use agriscan_shared::db::{
    migrations::run_migrations,
    pool::{create_pool, DatabaseConfig},
};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, Response};
use image::{ImageFormat, Rgb, RgbImage};
use ndarray::Array4;
use sqlx::SqlitePool;
use std::io::Cursor;
use std::sync::Arc;
use tower::Service as _;

pub const LABELS: [&str; 3] = ["Corn___rust", "Tomato___Late_blight", "Tomato___healthy"];

/// Always scores index 1 highest
pub struct FixedModel;

impl InferenceModel for FixedModel {
    fn input_spec(&self) -> InputSpec {
        InputSpec {
            size: 8,
            layout: TensorLayout::Nhwc,
        }
    }

    fn output_len(&self) -> Option<usize> {
        Some(LABELS.len())
    }

    fn run(&self, _input: Array4<f32>) -> Result<Vec<f32>, ClassifierError> {
        Ok(vec![0.05, 0.9, 0.05])
    }
}

/// Replies with the prompt it was given
pub struct EchoChat;

#[async_trait]
impl ChatClient for EchoChat {
    async fn complete(&self, prompt: &str) -> Result<String, ExternalServiceError> {
        Ok(format!("Echo: {}", prompt))
    }
}

/// Fails like an unreachable upstream
pub struct BrokenChat;

#[async_trait]
impl ChatClient for BrokenChat {
    async fn complete(&self, _prompt: &str) -> Result<String, ExternalServiceError> {
        Err(ExternalServiceError::InvalidResponse {
            service: "Chat completion",
            reason: "connection reset".to_string(),
        })
    }
}

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: SqlitePool,
    pub app: axum::Router,
}

impl TestContext {
    /// Creates a new test context with a fresh database and the echo chat client
    pub async fn new() -> anyhow::Result<Self> {
        Self::with_chat(Arc::new(EchoChat)).await
    }

    /// Creates a new test context with the given chat client
    pub async fn with_chat(chat: Arc<dyn ChatClient>) -> anyhow::Result<Self> {
        let config = Config::from_lookup(|key| match key {
            "SESSION_SECRET" => Some("test-secret-key-at-least-32-bytes-long".to_string()),
            "MAX_UPLOAD_BYTES" => Some("1048576".to_string()),
            _ => None,
        })?;

        let db = create_pool(DatabaseConfig::in_memory()).await?;
        run_migrations(&db).await?;

        let labels = LABELS.iter().map(|s| s.to_string()).collect();
        let classifier =
            ImageClassifier::new(Box::new(FixedModel), labels, ResizeFilter::Bilinear)?;

        let state = AppState::new(db.clone(), config, classifier, chat);
        let app = build_router(state);

        Ok(TestContext { db, app })
    }

    /// Sends one request through the router
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.app.clone().call(request).await.unwrap()
    }

    /// Signs up a user and returns the session cookie (`name=value`)
    pub async fn signup(&self, username: &str, password: &str) -> String {
        let response = self
            .send(form_post("/signup", &format!("u={}&p={}", username, password), None))
            .await;
        assert_eq!(response.status(), 303, "signup of {} failed", username);
        session_cookie(&response).expect("signup sets a session cookie")
    }
}

/// Builds a GET request, optionally with a cookie
pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

/// Builds a urlencoded form POST
pub fn form_post(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// Builds a JSON POST
pub fn json_post(uri: &str, body: serde_json::Value, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub const BOUNDARY: &str = "agriscan-test-boundary";

/// One multipart part: (field name, optional file name, content)
pub type Part<'a> = (&'a str, Option<&'a str>, &'a [u8]);

/// Builds a multipart/form-data POST
pub fn multipart_post(uri: &str, parts: &[Part<'_>], cookie: Option<&str>) -> Request<Body> {
    let mut body = Vec::new();
    for (name, file_name, content) in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match file_name {
            Some(file_name) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                        name, file_name
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
            }
            None => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name)
                        .as_bytes(),
                );
            }
        }
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        );
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body)).unwrap()
}

/// Extracts `agriscan_session=...` from a Set-Cookie header, if present
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("agriscan_session="))
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

/// Redirect target of a response
pub fn location(response: &Response<Body>) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
}

/// Collects a response body into a string
pub async fn body_string(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8_lossy(&bytes).into_owned()
}

/// A small solid-colour PNG
pub fn png_bytes() -> Vec<u8> {
    let img = RgbImage::from_pixel(32, 24, Rgb([40, 160, 60]));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).unwrap();
    buf.into_inner()
}
