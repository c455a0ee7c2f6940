use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;

use crate::config::EngineConfig;
use crate::data::source::{CatalogProvider, FileCatalogProvider};

pub mod api;
pub mod routes;

/// Shared, read-only state. Each request builds its own engine and catalog cache.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<EngineConfig>,
    pub provider: Arc<dyn CatalogProvider + Send + Sync>,
}

impl AppState {
    pub fn new(config: EngineConfig, provider: Arc<dyn CatalogProvider + Send + Sync>) -> Self {
        Self {
            config: Arc::new(config),
            provider,
        }
    }

    /// File-backed catalogs under `config.catalog_dir`.
    pub fn from_config(config: EngineConfig) -> Self {
        let provider = Arc::new(FileCatalogProvider::new(config.catalog_dir.clone()));
        Self::new(config, provider)
    }
}

impl IntoResponse for routes::HttpResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, [(header::CONTENT_TYPE, self.content_type)], Body::from(self.body)).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new().fallback(dispatch).with_state(state)
}

/// Every request goes through [routes::route_request] on the blocking pool, since
/// evaluation may read catalog files.
async fn dispatch(State(state): State<AppState>, method: Method, uri: Uri, body: String) -> Response {
    let path = uri.path().to_string();
    let method_name = method.as_str().to_string();
    let result = tokio::task::spawn_blocking(move || {
        routes::route_request(&method_name, &path, &body, &state)
    })
    .await;
    match result {
        Ok(response) => {
            tracing::debug!(%method, uri = %uri, status = response.status_code, "request handled");
            response.into_response()
        }
        Err(err) => {
            tracing::error!(%method, uri = %uri, error = %err, "request handler failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "request handler failed").into_response()
        }
    }
}

pub async fn serve(bind_addr: &str, state: AppState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!("engagement server listening on http://{bind_addr}");
    axum::serve(listener, router(state)).await
}

pub fn run_server(bind_addr: &str, config: EngineConfig) -> std::io::Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(serve(bind_addr, AppState::from_config(config)))
}
