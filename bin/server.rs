// Geo Metrics - Web Server
// JSON API over the dashboard reducer, consumed by the map and table front end

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use geo_metrics::{
    get_all_entities, init_tracing, open_database, Dashboard, DashboardConfig, EntityType,
    GeometryProperties, GeometryStyle, Selection, SummaryMetrics, TableRow, ViewMode, ViewModel,
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Shared application state
#[derive(Clone)]
struct AppState {
    dashboard: Arc<Mutex<Dashboard>>,
}

impl AppState {
    fn lock(&self) -> MutexGuard<'_, Dashboard> {
        // A poisoned lock still holds a consistent ViewModel: every
        // transition swaps in a fully built value.
        self.dashboard
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// View response (the ViewModel plus what the table and header need)
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ViewResponse {
    view_mode: ViewMode,
    selection: Selection,
    selected_state: Option<String>,
    entities: usize,
    summary: SummaryMetrics,
    top: Vec<TableRow>,
}

impl ViewResponse {
    fn from_dashboard(dashboard: &Dashboard) -> Self {
        let view: &ViewModel = dashboard.view();
        Self {
            view_mode: view.view_mode,
            selection: view.selection.clone(),
            selected_state: view.selected_state().map(str::to_string),
            entities: view.dataset.len(),
            summary: dashboard.summary(),
            top: dashboard.table(),
        }
    }
}

#[derive(Deserialize)]
struct ClickRequest {
    name: String,
    #[serde(rename = "type")]
    entity_type: EntityType,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StyleRequest {
    properties: GeometryProperties,
    #[serde(default)]
    type_hint: Option<EntityType>,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/view - Current view mode, selection, totals and top rows
async fn get_view(State(state): State<AppState>) -> impl IntoResponse {
    let dashboard = state.lock();
    Json(ApiResponse::ok(ViewResponse::from_dashboard(&dashboard)))
}

/// GET /api/entities - Full active dataset
async fn get_entities(State(state): State<AppState>) -> impl IntoResponse {
    let dashboard = state.lock();
    Json(ApiResponse::ok(dashboard.view().dataset.clone()))
}

/// GET /api/top - Top rows by revenue
async fn get_top(State(state): State<AppState>) -> impl IntoResponse {
    let dashboard = state.lock();
    Json(ApiResponse::ok(dashboard.table()))
}

/// GET /api/summary - Revenue and college totals
async fn get_summary(State(state): State<AppState>) -> impl IntoResponse {
    let dashboard = state.lock();
    Json(ApiResponse::ok(dashboard.summary()))
}

/// POST /api/view-mode/:mode - Switch view mode (clears drill-down)
async fn set_view_mode(
    State(state): State<AppState>,
    Path(mode): Path<String>,
) -> impl IntoResponse {
    let mode: ViewMode = match mode.parse() {
        Ok(mode) => mode,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::<ViewResponse>::err(e.to_string())),
            )
                .into_response()
        }
    };

    let mut dashboard = state.lock();
    dashboard.set_view_mode(mode);

    (
        StatusCode::OK,
        Json(ApiResponse::ok(ViewResponse::from_dashboard(&dashboard))),
    )
        .into_response()
}

/// POST /api/click - Geometry click; drills into a state or is absorbed
async fn click_geography(
    State(state): State<AppState>,
    Json(request): Json<ClickRequest>,
) -> impl IntoResponse {
    let mut dashboard = state.lock();
    dashboard.click(&request.name, request.entity_type);

    Json(ApiResponse::ok(ViewResponse::from_dashboard(&dashboard)))
}

/// POST /api/reset - Back to the state overview
async fn reset(State(state): State<AppState>) -> impl IntoResponse {
    let mut dashboard = state.lock();
    dashboard.reset();

    Json(ApiResponse::ok(ViewResponse::from_dashboard(&dashboard)))
}

/// POST /api/style - Resolve a geometry's name and fill style
async fn style_geometry(
    State(state): State<AppState>,
    Json(request): Json<StyleRequest>,
) -> impl IntoResponse {
    let mut dashboard = state.lock();
    let styled: GeometryStyle = dashboard.style_geometry(&request.properties, request.type_hint);

    Json(ApiResponse::ok(styled))
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() {
    init_tracing();

    let config = match DashboardConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    let db_path = config.database_path.as_path();
    if !db_path.exists() {
        error!("Database not found at {:?}", db_path);
        eprintln!("   Run: geo-metrics import <entities.csv>");
        eprintln!("   to import entities first.");
        std::process::exit(1);
    }

    let entities = match open_database(db_path).and_then(|conn| get_all_entities(&conn)) {
        Ok(entities) => entities,
        Err(e) => {
            error!("Failed to load entities: {:#}", e);
            std::process::exit(1);
        }
    };
    info!(entities = entities.len(), db = ?db_path, policy = %config.orphan_policy, "entities loaded");

    // Create shared state
    let state = AppState {
        dashboard: Arc::new(Mutex::new(Dashboard::new(entities, &config))),
    };

    // Build API routes
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/view", get(get_view))
        .route("/entities", get(get_entities))
        .route("/top", get(get_top))
        .route("/summary", get(get_summary))
        .route("/view-mode/:mode", post(set_view_mode))
        .route("/click", post(click_geography))
        .route("/reset", post(reset))
        .route("/style", post(style_geometry))
        .with_state(state);

    let app = Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Start server
    let listener = match tokio::net::TcpListener::bind(&config.listen_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", config.listen_addr, e);
            std::process::exit(1);
        }
    };

    info!("🚀 Server running on http://{}", config.listen_addr);
    info!("   API: http://{}/api/view", config.listen_addr);

    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
    }
}
