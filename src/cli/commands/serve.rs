//! HTTP server for the browser client and the REST API.

use crate::api::{create_router, AppState};
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;
use tracing::info;

/// Run the HTTP server.
pub async fn run_serve(host: Option<String>, port: Option<u16>, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Serve, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'voxdoc doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let host = host.unwrap_or_else(|| settings.server.host.clone());
    let port = port.unwrap_or(settings.server.port);

    let state = AppState::from_settings(&settings)?;
    let app = create_router(state.clone(), settings.server.max_upload_bytes());

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, bucket = %state.uploads.bucket().name(), "Server listening");

    Output::header("Voxdoc Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Client", "GET  /");
    Output::kv("Health", "GET  /health");
    Output::kv("Upload PDF", "POST /upload_pdf");
    Output::kv("Upload audio", "POST /upload_audio");
    Output::kv("Chat", "POST /chat");
    Output::kv("List PDFs", "GET  /list_pdfs");
    Output::kv("Files", "GET  /pdfs/<name>, /audio/<name>");
    println!();
    Output::kv("Uploads", &state.store.pdf_dir().display().to_string());
    Output::kv("Bucket", state.uploads.bucket().name());
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}
