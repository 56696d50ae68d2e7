//! Application setup and router assembly.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{header::CONTENT_TYPE, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::pipeline::RedirectPipeline;
use crate::server::routes::{
    cancel_handler, create_batch_handler, export_redirects_handler, health_handler,
    list_redirects_handler, list_scraped_pages_handler, list_urls_handler, match_handler,
    save_scraped_page_handler, scrape_handler,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<RedirectPipeline>,
}

/// Build the Axum application router
pub fn build_app(pipeline: RedirectPipeline) -> Router {
    let app_state = AppState {
        pipeline: Arc::new(pipeline),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/batch", post(create_batch_handler))
        .route("/api/scrape", post(scrape_handler))
        .route("/api/scrape/by-batch", get(list_scraped_pages_handler))
        .route("/api/scrape/save", post(save_scraped_page_handler))
        .route("/api/match", post(match_handler))
        .route("/api/cancel", post(cancel_handler))
        .route("/api/urls", get(list_urls_handler))
        .route("/api/redirects", get(list_redirects_handler))
        .route("/api/redirects/export", get(export_redirects_handler))
        .layer(Extension(app_state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
