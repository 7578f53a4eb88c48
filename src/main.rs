mod classifier;
mod constants;
mod error;
mod frames;
mod models;
mod pipeline;
mod routes;

use axum::extract::DefaultBodyLimit;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use classifier::Classifier;
use constants::{DEFAULT_FRAME_COUNT, MAX_UPLOAD_SIZE};

#[derive(Clone)]
pub struct AppState {
    pub classifier: Option<Arc<Classifier>>,
    pub upload_dir: PathBuf,
    pub frame_count: usize,
}

#[tokio::main]
async fn main() {
    let model_path =
        std::env::var("MODEL_PATH").unwrap_or_else(|_| "model/image_model.onnx".to_string());
    let upload_dir =
        PathBuf::from(std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string()));
    let frame_count = frame_count_per_video();

    tokio::fs::create_dir_all(&upload_dir)
        .await
        .expect("Failed to create upload directory");

    // A missing or broken model artifact leaves the service in degraded
    // mode: every prediction returns Unknown until it is restored.
    let classifier = match Classifier::load(&model_path) {
        Ok(c) => {
            println!("Model loaded successfully from {}", model_path);
            Some(Arc::new(c))
        }
        Err(e) => {
            eprintln!("Could not load model from {}: {}", model_path, e);
            eprintln!("Running without a model: all predictions will return Unknown");
            None
        }
    };

    let state = Arc::new(AppState {
        classifier,
        upload_dir,
        frame_count,
    });

    let app = routes::build_routes()
        .layer(CorsLayer::permissive())
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_SIZE))
        .with_state(state);

    let port = std::env::var("PORT").unwrap_or_else(|_| "5000".to_string());
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| panic!("Failed to bind to {}: {}", addr, e));

    println!("Listening on http://{}", addr);
    axum::serve(listener, app).await.expect("Server failed");
}

fn frame_count_per_video() -> usize {
    std::env::var("FRAME_COUNT")
        .ok()
        .and_then(|s| s.parse().ok())
        .filter(|v| *v > 0)
        .unwrap_or(DEFAULT_FRAME_COUNT)
}
