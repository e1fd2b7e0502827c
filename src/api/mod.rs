//! HTTP API.
//!
//! Routes:
//! - `GET /` and `GET /static/scripts.js` - the browser client
//! - `GET /health`
//! - `POST /upload_pdf`, `POST /upload_audio` - multipart uploads
//! - `POST /chat` - one spoken question about a stored PDF
//! - `GET /list_pdfs` - PDFs in the bucket
//! - `GET /pdfs/*`, `GET /audio/*` - raw files from local storage

mod error;
mod handlers;
mod types;

pub use error::ApiError;

use crate::chat::ChatService;
use crate::config::Settings;
use crate::storage::{BucketClient, LocalStore};
use crate::uploads::UploadService;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub store: LocalStore,
    pub uploads: Arc<UploadService>,
    pub chat: Arc<ChatService>,
}

impl AppState {
    pub fn new(store: LocalStore, uploads: UploadService, chat: ChatService) -> Self {
        Self {
            store,
            uploads: Arc::new(uploads),
            chat: Arc::new(chat),
        }
    }

    /// Build the local store, bucket and remote clients from configuration.
    pub fn from_settings(settings: &Settings) -> crate::Result<Self> {
        let store = LocalStore::new(settings.upload_dir())?;
        let bucket = Arc::new(BucketClient::from_settings(settings)?);

        let uploads = UploadService::new(store.clone(), bucket.clone());
        let chat = ChatService::from_settings(settings, store.clone(), bucket)?;

        Ok(Self::new(store, uploads, chat))
    }
}

/// Build the router with all routes and layers.
pub fn create_router(state: AppState, max_upload_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::index))
        .route("/static/scripts.js", get(handlers::scripts))
        .route("/health", get(handlers::health))
        .route("/upload_pdf", post(handlers::upload_pdf))
        .route("/upload_audio", post(handlers::upload_audio))
        .route("/chat", post(handlers::chat))
        .route("/list_pdfs", get(handlers::list_pdfs))
        .nest_service("/pdfs", ServeDir::new(state.store.pdf_dir()))
        .nest_service("/audio", ServeDir::new(state.store.audio_dir()))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CachePolicy, Prompts};
    use crate::qa::{DocumentQa, QaError};
    use crate::speech::{SpeechClient, SpeechError, SpeechSynthesizer};
    use crate::storage::{PdfLocalizer, PDF_CONTENT_TYPE};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use serde_json::Value;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    const BOUNDARY: &str = "voxdoc-test-boundary";

    struct FakeQa {
        answer: Option<&'static str>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl DocumentQa for FakeQa {
        async fn answer(&self, _pdf: &Path, _audio: &Path, _instruction: &str) -> Result<String, QaError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.answer {
                Some(text) => Ok(text.to_string()),
                None => Err(QaError::Api {
                    status: 503,
                    message: "model overloaded".to_string(),
                }),
            }
        }
    }

    #[derive(Default)]
    struct FakeSpeech {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SpeechSynthesizer for FakeSpeech {
        async fn synthesize(&self, _text: &str) -> Result<Vec<u8>, SpeechError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(b"RIFF-answer".to_vec())
        }
    }

    struct TestApp {
        _dir: tempfile::TempDir,
        router: Router,
        store: LocalStore,
        bucket: Arc<BucketClient>,
        qa: Arc<FakeQa>,
        speech: Arc<FakeSpeech>,
    }

    fn test_app(answer: Option<&'static str>) -> TestApp {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path()).unwrap();
        let bucket = Arc::new(BucketClient::in_memory("test-bucket"));
        let qa = Arc::new(FakeQa {
            answer,
            calls: AtomicUsize::new(0),
        });
        let speech = Arc::new(FakeSpeech::default());

        let chat = ChatService::new(
            store.clone(),
            PdfLocalizer::new(store.clone(), bucket.clone(), CachePolicy::DownloadOnce),
            qa.clone(),
            SpeechClient::new(speech.clone(), store.clone()),
            Prompts::default(),
        );
        let uploads = UploadService::new(store.clone(), bucket.clone());
        let router = create_router(AppState::new(store.clone(), uploads, chat), 1024 * 1024);

        TestApp {
            _dir: dir,
            router,
            store,
            bucket,
            qa,
            speech,
        }
    }

    enum Part<'a> {
        Text(&'a str, &'a str),
        File(&'a str, &'a str, &'a [u8]),
    }

    fn multipart_request(uri: &str, parts: &[Part]) -> Request<Body> {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
            match part {
                Part::Text(name, value) => {
                    body.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
                    );
                    body.extend_from_slice(value.as_bytes());
                }
                Part::File(name, filename, data) => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                             Content-Type: application/octet-stream\r\n\r\n",
                            name, filename
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(data);
                }
            }
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn send(app: &TestApp, req: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = app.router.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    async fn send_json(app: &TestApp, req: Request<Body>) -> (StatusCode, Value) {
        let (status, body) = send(app, req).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_health_and_landing_page() {
        let app = test_app(Some("ok"));

        let (status, body) = send_json(&app, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");

        let (status, body) = send(&app, get("/")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(String::from_utf8(body).unwrap().contains("/static/scripts.js"));

        let (status, _) = send(&app, get("/static/scripts.js")).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_upload_pdf_stores_locally_and_in_bucket() {
        let app = test_app(Some("ok"));

        let req = multipart_request("/upload_pdf", &[Part::File("pdf_file", "my report.pdf", b"%PDF-1.4")]);
        let (status, body) = send_json(&app, req).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "pdf uploaded successfully");
        assert_eq!(body["filename"], "my_report.pdf");
        assert_eq!(body["cloud_filename"], "my_report.pdf");
        assert!(app.store.has_pdf("my_report.pdf").await.unwrap());
        assert_eq!(app.bucket.fetch("my_report.pdf").await.unwrap(), b"%PDF-1.4");
    }

    #[tokio::test]
    async fn test_upload_non_pdf_is_rejected() {
        let app = test_app(Some("ok"));

        let req = multipart_request("/upload_pdf", &[Part::File("pdf_file", "photo.png", b"\x89PNG")]);
        let (status, body) = send_json(&app, req).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid file type");
        assert_eq!(app.store.usage().unwrap().pdf_count, 0);
        assert!(app.bucket.list_names().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upload_without_file_part() {
        let app = test_app(Some("ok"));

        let req = multipart_request("/upload_pdf", &[Part::Text("note", "hello")]);
        let (status, body) = send_json(&app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "no pdf file part");

        let req = multipart_request("/upload_audio", &[Part::Text("note", "hello")]);
        let (status, body) = send_json(&app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "no audio file part");
    }

    #[tokio::test]
    async fn test_upload_audio() {
        let app = test_app(Some("ok"));

        let req = multipart_request("/upload_audio", &[Part::File("audio_file", "clip.wav", b"RIFF")]);
        let (status, body) = send_json(&app, req).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "audio uploaded successfully");
        assert_eq!(body["filename"], "clip.wav");
        assert!(app.store.has_audio("clip.wav").await.unwrap());
    }

    #[tokio::test]
    async fn test_chat_unknown_pdf_is_404_without_calls() {
        let app = test_app(Some("ok"));

        let req = multipart_request(
            "/chat",
            &[
                Part::Text("pdf_filename", "nowhere.pdf"),
                Part::File("audio_file", "question.wav", b"RIFF"),
            ],
        );
        let (status, body) = send_json(&app, req).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "pdf file not found");
        assert_eq!(app.qa.calls.load(Ordering::SeqCst), 0);
        assert_eq!(app.speech.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_chat_round_trip() {
        let app = test_app(Some("Chapter two covers pricing."));
        app.bucket
            .put("guide.pdf", b"%PDF".to_vec(), PDF_CONTENT_TYPE)
            .await
            .unwrap();

        let req = multipart_request(
            "/chat",
            &[
                Part::Text("pdf_filename", "guide.pdf"),
                Part::File("audio_file", "question.wav", b"RIFF-question"),
            ],
        );
        let (status, body) = send_json(&app, req).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["response_text"], "Chapter two covers pricing.");

        let url = body["tts_audio_url"].as_str().unwrap();
        assert!(url.starts_with("/audio/ai_") && url.ends_with(".wav"));

        let (status, audio) = send(&app, get(url)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(audio, b"RIFF-answer");
    }

    #[tokio::test]
    async fn test_chat_about_listed_blob_with_unsafe_name() {
        let app = test_app(Some("Revenue grew."));
        app.bucket
            .put("Q3 Report.pdf", b"%PDF-q3".to_vec(), PDF_CONTENT_TYPE)
            .await
            .unwrap();

        let (status, body) = send_json(&app, get("/list_pdfs")).await;
        assert_eq!(status, StatusCode::OK);
        let listed = body["pdfs"][0].as_str().unwrap().to_string();
        assert_eq!(listed, "Q3 Report.pdf");

        let req = multipart_request(
            "/chat",
            &[
                Part::Text("pdf_filename", listed.as_str()),
                Part::File("audio_file", "question.wav", b"RIFF"),
            ],
        );
        let (status, body) = send_json(&app, req).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["response_text"], "Revenue grew.");
        assert!(app.store.has_pdf("Q3_Report.pdf").await.unwrap());
        assert_eq!(app.qa.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_filenames_are_rejected() {
        let app = test_app(Some("ok"));
        app.store.save_pdf("guide.pdf", b"%PDF").await.unwrap();

        let req = multipart_request("/upload_pdf", &[Part::File("pdf_file", "", b"%PDF")]);
        let (status, body) = send_json(&app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "no selected file");
        assert!(app.bucket.list_names().await.unwrap().is_empty());

        let req = multipart_request(
            "/chat",
            &[
                Part::Text("pdf_filename", "guide.pdf"),
                Part::File("audio_file", "", b"RIFF"),
            ],
        );
        let (status, body) = send_json(&app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "no audio file selected");
        assert_eq!(app.qa.calls.load(Ordering::SeqCst), 0);
        assert_eq!(app.store.usage().unwrap().audio_count, 0);
    }

    #[tokio::test]
    async fn test_chat_validation_order() {
        let app = test_app(Some("ok"));
        app.store.save_pdf("guide.pdf", b"%PDF").await.unwrap();

        let req = multipart_request("/chat", &[Part::File("audio_file", "q.wav", b"RIFF")]);
        let (status, body) = send_json(&app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "missing pdf filename");

        let req = multipart_request(
            "/chat",
            &[
                Part::Text("pdf_filename", "../secrets.pdf"),
                Part::File("audio_file", "q.wav", b"RIFF"),
            ],
        );
        let (status, body) = send_json(&app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid pdf filename");

        let req = multipart_request("/chat", &[Part::Text("pdf_filename", "guide.pdf")]);
        let (status, body) = send_json(&app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "no audio file part");

        let req = multipart_request(
            "/chat",
            &[
                Part::Text("pdf_filename", "guide.pdf"),
                Part::File("audio_file", "q.wav", b""),
            ],
        );
        let (status, body) = send_json(&app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "empty audio file");

        assert_eq!(app.qa.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_chat_model_failure_is_bad_gateway() {
        let app = test_app(None);
        app.store.save_pdf("guide.pdf", b"%PDF").await.unwrap();

        let req = multipart_request(
            "/chat",
            &[
                Part::Text("pdf_filename", "guide.pdf"),
                Part::File("audio_file", "q.wav", b"RIFF"),
            ],
        );
        let (status, body) = send_json(&app, req).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body["error"].as_str().unwrap().contains("model overloaded"));
        assert_eq!(app.speech.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_list_pdfs_filters_by_extension() {
        let app = test_app(Some("ok"));
        for name in ["b.pdf", "A.PDF", "notes.txt", "archive.pdf.zip"] {
            app.bucket.put(name, b"x".to_vec(), PDF_CONTENT_TYPE).await.unwrap();
        }

        let (status, body) = send_json(&app, get("/list_pdfs")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["pdfs"], serde_json::json!(["A.PDF", "b.pdf"]));
    }

    #[tokio::test]
    async fn test_serves_stored_pdfs() {
        let app = test_app(Some("ok"));
        app.store.save_pdf("doc.pdf", b"%PDF-bytes").await.unwrap();

        let (status, body) = send(&app, get("/pdfs/doc.pdf")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"%PDF-bytes");

        let (status, _) = send(&app, get("/pdfs/missing.pdf")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_missing_audio_is_404() {
        let app = test_app(Some("ok"));
        app.store.save_audio("user_1.wav", b"RIFF").await.unwrap();

        let (status, body) = send(&app, get("/audio/user_1.wav")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"RIFF");

        let (status, _) = send(&app, get("/audio/missing.wav")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
