//! Budget Buddy Web Server
//!
//! Axum-based REST API for the Budget Buddy expense tracker.
//!
//! Security features:
//! - Per-user bearer-token authentication on every data route
//! - Restrictive CORS policy
//! - Input validation before any write
//! - Sanitized error responses (internals logged, never returned)

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Serialize;
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use buddy_core::{Database, GatewayError, InsightBackend, InsightClient};

pub mod auth;
mod handlers;

pub use auth::AuthUser;

/// Server configuration
#[derive(Clone)]
pub struct ServerConfig {
    /// HS256 signing secret for session tokens
    pub secret: String,
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
}

impl ServerConfig {
    pub fn new(secret: &str) -> Self {
        Self {
            secret: secret.to_string(),
            allowed_origins: vec![],
        }
    }
}

/// Shared application state
pub struct AppState {
    pub db: Database,
    pub config: ServerConfig,
    /// Completion gateway; insight routes answer 503 when unset
    pub ai: Option<InsightClient>,
}

/// Success response
#[derive(Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Create the application router, wiring the gateway from the environment
pub fn create_router(db: Database, config: ServerConfig) -> Router {
    let ai = InsightClient::from_env();
    match ai {
        Some(ref client) => {
            info!(
                "Insight gateway configured: {} (model: {})",
                client.host(),
                client.model()
            );
        }
        None => {
            info!("Insight gateway not configured (set PERPLEXITY_API_KEY to enable insights)");
        }
    }
    create_router_with_ai(db, config, ai)
}

/// Create the application router with an explicit gateway (for testing)
pub fn create_router_with_ai(
    db: Database,
    config: ServerConfig,
    ai: Option<InsightClient>,
) -> Router {
    let state = Arc::new(AppState {
        db,
        config: config.clone(),
        ai,
    });

    // Routes reachable without a session
    let public_routes = Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login));

    let protected_routes = Router::new()
        // Session
        .route("/logout", post(handlers::logout))
        .route("/me", get(handlers::get_me))
        // Expenses
        .route(
            "/expenses",
            get(handlers::list_expenses).post(handlers::create_expense),
        )
        .route(
            "/expenses/:id",
            put(handlers::update_expense).delete(handlers::delete_expense),
        )
        // Aggregation views
        .route("/dashboard", get(handlers::get_dashboard))
        .route("/categories", get(handlers::get_categories))
        .route("/insights", get(handlers::get_insights))
        // Budget
        .route(
            "/budget",
            get(handlers::get_budget).put(handlers::set_budget),
        )
        // AI advisor
        .route("/submit", post(handlers::submit_query))
        .route("/get_ai_insights", post(handlers::get_ai_insights))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::auth_middleware,
        ));

    let api_routes = public_routes.merge(protected_routes);

    // Build CORS layer
    let cors = if config.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    };

    Router::new()
        .nest("/api", api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            HeaderValue::from_static(
                "default-src 'self'; frame-ancestors 'none'",
            ),
        ))
}

/// Start the server
pub async fn serve(db: Database, host: &str, port: u16, config: ServerConfig) -> anyhow::Result<()> {
    let app = create_router(db, config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn unauthorized(msg: &str) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn conflict(msg: &str) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn service_unavailable(msg: &str) -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            message: msg.to_string(),
            internal: None,
        }
    }

    /// 500 with a generic client message; the real error goes to the log
    pub(crate) fn internal_with(err: anyhow::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "An internal error occurred".to_string(),
            internal: Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl From<buddy_core::Error> for AppError {
    fn from(err: buddy_core::Error) -> Self {
        match err {
            buddy_core::Error::Validation(msg) => Self::bad_request(&msg),
            buddy_core::Error::NotFound(what) => Self::not_found(&format!("{} not found", what)),
            buddy_core::Error::Conflict(msg) => Self::conflict(&msg),
            buddy_core::Error::Gateway(e) => Self::from(e),
            other => Self::internal_with(other.into()),
        }
    }
}

impl From<GatewayError> for AppError {
    fn from(err: GatewayError) -> Self {
        // Budget data is unaffected; surface the failure as an upstream error
        warn!(error = %err, "Insight gateway call failed");
        Self {
            status: StatusCode::BAD_GATEWAY,
            message: "The insight service is currently unavailable".to_string(),
            internal: Some(err.into()),
        }
    }
}
