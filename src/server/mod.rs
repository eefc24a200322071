use axum::{
    extract::DefaultBodyLimit,
    routing::{any, get, put},
    Router,
};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use crate::config::ServeSettings;
use crate::storage::EmployeeStore;
use crate::ui::Icons;
use crate::upload::UploadDir;

pub mod error;
pub mod multipart;
pub mod routes;

/// Largest accepted request body (form fields plus all four documents)
pub const MAX_BODY_BYTES: usize = 50 * 1024 * 1024;

/// Server state
pub struct AppState {
    pub store: Mutex<EmployeeStore>,
    pub uploads: UploadDir,
}

impl AppState {
    pub fn new(store: EmployeeStore, uploads: UploadDir) -> Self {
        Self {
            store: Mutex::new(store),
            uploads,
        }
    }
}

/// Build the application router.
///
/// `/api/*` paths that match no route, or match a route without a handler
/// for the method, answer with a JSON 404. When `dist_dir` is given, the
/// built UI is served for every other path with `index.html` as fallback.
pub fn router(state: Arc<AppState>, dist_dir: Option<&Path>) -> Router {
    let uploads = ServeDir::new(state.uploads.path());

    let mut app = Router::new()
        .route("/ping", get(routes::ping))
        .route("/api/health", get(routes::health))
        .route("/api/employees", get(routes::list_employees).post(routes::create_employee))
        .route("/api/employees/stats", get(routes::get_stats))
        .route("/api/employees/divisions", get(routes::get_divisions))
        .route(
            "/api/employees/{id}",
            put(routes::update_employee).delete(routes::delete_employee),
        )
        .route("/api", any(routes::api_not_found))
        .route("/api/{*rest}", any(routes::api_not_found))
        .method_not_allowed_fallback(routes::api_not_found)
        .nest_service("/uploads", uploads);

    if let Some(dist) = dist_dir {
        let spa = ServeDir::new(dist).fallback(ServeFile::new(dist.join("index.html")));
        app = app.fallback_service(spa);
    }

    app.layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start_server(settings: ServeSettings) -> anyhow::Result<()> {
    crate::config::ensure_db_dir(&settings.database)?;
    tracing::info!("Initializing database at: {}", settings.database.display());
    let store = EmployeeStore::open(&settings.database)?;
    tracing::info!("Database connection successful");

    let uploads = UploadDir::new(&settings.upload_dir);
    match uploads.ensure() {
        Ok(()) => tracing::info!("Upload directory is ready and writable: {}", uploads.path().display()),
        Err(e) => tracing::error!("Error with upload directory {}: {}", uploads.path().display(), e),
    }

    if let Some(dist) = &settings.dist_dir {
        if dist.exists() {
            tracing::info!("Serving static files from: {}", dist.display());
        } else {
            tracing::warn!("dist directory not found at {}", dist.display());
        }
    }

    let state = Arc::new(AppState::new(store, uploads));
    let app = router(state, settings.dist_dir.as_deref());

    let addr: SocketAddr = format!("{}:{}", settings.host, settings.port).parse()?;
    tracing::info!("Starting server on {}", addr);
    println!("{} Server running at http://{}", Icons::GLOBE, addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
