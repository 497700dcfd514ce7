use anyhow::{Context, Result};
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use shardfts_core::persist::{load_meta, IndexPaths};
use shardfts_core::shard::{is_valid_key, SHARD_EXTENSION};
use std::path::PathBuf;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

const OCTET_STREAM: &str = "application/octet-stream";
const JSON: &str = "application/json";

#[derive(Clone)]
pub struct AppState {
    pub index_root: PathBuf,
}

/// Static publisher for a built index directory. Files are served under the same
/// names they have on disk (`/<key>.shard`, `/store.bin`, `/meta.json`), so a
/// client can use the server root or the directory itself as its base.
/// It never evaluates queries.
pub fn build_app(index_dir: String) -> Result<Router> {
    let root = PathBuf::from(&index_dir);
    if !root.is_dir() {
        anyhow::bail!("index directory {} does not exist", root.display());
    }
    // startup read is for logging only; handlers read meta.json from disk
    let paths = IndexPaths::new(&root);
    if paths.meta().exists() {
        let meta = load_meta(&paths).with_context(|| format!("failed to read {}", paths.meta().display()))?;
        tracing::info!(num_shards = meta.num_shards, shard_width = meta.shard_width, "serving sharded index");
    }
    let app_state = AppState { index_root: root };

    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/meta.json", get(meta_handler))
        .route("/store.bin", get(store_handler))
        .route("/:file", get(shard_handler))
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());
    Ok(app)
}

async fn meta_handler(State(state): State<AppState>) -> Result<Response, (StatusCode, String)> {
    serve_file(IndexPaths::new(&state.index_root).meta(), JSON).await
}

async fn store_handler(State(state): State<AppState>) -> Result<Response, (StatusCode, String)> {
    serve_file(IndexPaths::new(&state.index_root).store(), OCTET_STREAM).await
}

async fn shard_handler(State(state): State<AppState>, Path(file): Path<String>) -> Result<Response, (StatusCode, String)> {
    let key = parse_shard_file(&file).ok_or((StatusCode::BAD_REQUEST, format!("invalid shard name {file:?}")))?;
    serve_file(IndexPaths::new(&state.index_root).shard(key), OCTET_STREAM).await
}

/// `<key>.shard` -> `<key>`, rejecting anything that is not a hex shard key.
pub fn parse_shard_file(file: &str) -> Option<&str> {
    let key = file.strip_suffix(SHARD_EXTENSION)?.strip_suffix('.')?;
    is_valid_key(key).then_some(key)
}

async fn serve_file(path: PathBuf, content_type: &'static str) -> Result<Response, (StatusCode, String)> {
    match tokio::fs::read(&path).await {
        Ok(bytes) => Ok(([(header::CONTENT_TYPE, content_type)], bytes).into_response()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
            Err((StatusCode::NOT_FOUND, format!("{name} not found")))
        }
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "failed to read index file");
            Err((StatusCode::INTERNAL_SERVER_ERROR, "failed to read index file".into()))
        }
    }
}
