//! Caixa Web Server
//!
//! Axum-based JSON API for the caixa dashboard. Every view is its own
//! endpoint and fails independently with an `{"error": "..."}` body:
//!
//! - invalid input: 400
//! - unknown session or unresolvable postal code: 404
//! - financial API failure: 502
//! - financial API token not configured: 503

use std::sync::Arc;

use axum::{
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::{error, info, warn};

use caixa_core::{
    AppConfig, CacheMode, CacheStore, CepResolver, Clock, ConfigError, Dashboard, FetchError,
    FinanceClient, HttpClient, ResolutionError, SessionStore, ValidationError,
};

mod handlers;

#[cfg(test)]
mod tests;

/// Shared application state.
pub struct AppState {
    /// `None` when no financial API token is configured.
    pub dashboard: Option<Dashboard>,
    pub resolver: CepResolver,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(dashboard: Option<Dashboard>, resolver: CepResolver, sessions: SessionStore) -> Self {
        Self {
            dashboard,
            resolver,
            sessions,
        }
    }

    /// Wires state from configuration. A missing token disables the
    /// financial views only; postal lookup and forms keep working.
    pub fn from_config(
        config: &AppConfig,
        transport: Arc<dyn HttpClient>,
        clock: Arc<dyn Clock>,
        cache_mode: CacheMode,
    ) -> Self {
        let cache = CacheStore::new(config.api.cache_ttl);
        let dashboard = match FinanceClient::from_config(config, Arc::clone(&transport), cache) {
            Ok(finance) => Some(Dashboard::new(
                finance.with_cache_mode(cache_mode),
                clock,
                config.api.movements_since,
            )),
            Err(error) => {
                warn!(error = %error, "financial views disabled");
                None
            }
        };
        let resolver =
            CepResolver::from_order(transport, &config.cep.providers, config.cep.timeout_ms);

        Self::new(dashboard, resolver, SessionStore::default())
    }

    fn dashboard(&self) -> Result<&Dashboard, AppError> {
        self.dashboard
            .as_ref()
            .ok_or_else(|| AppError::from(ConfigError::MissingToken))
    }
}

/// Builds the router; `static_dir` serves a front end for non-API paths.
pub fn create_router(state: Arc<AppState>, static_dir: Option<&str>) -> Router {
    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/cep/:cep", get(handlers::lookup_cep))
        .route("/movements", get(handlers::movements))
        .route("/balances", get(handlers::balances))
        .route("/banks", get(handlers::banks))
        .route("/receivables", get(handlers::receivables))
        .route("/sessions", post(handlers::create_session))
        .route("/sessions/:id", delete(handlers::delete_session))
        .route(
            "/sessions/:id/form",
            get(handlers::get_form).put(handlers::put_form),
        )
        .route("/sessions/:id/form/address", post(handlers::fill_address))
        .route("/sessions/:id/form/export", get(handlers::export_form));

    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE]);

    let mut app = Router::new()
        .nest("/api", api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app
}

/// Start the server
pub async fn serve(
    state: AppState,
    host: &str,
    port: u16,
    static_dir: Option<&str>,
) -> anyhow::Result<()> {
    if state.dashboard.is_none() {
        warn!("financial API token missing; statement, balance and receivable views return 503");
    }

    let app = create_router(Arc::new(state), static_dir);
    let addr = format!("{host}:{port}");

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Error rendered as `{"error": message}`.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }

    pub fn not_found(msg: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, msg)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    fn new(status: StatusCode, msg: &str) -> Self {
        Self {
            status,
            message: msg.to_string(),
            internal: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        Self::bad_request(&err.to_string())
    }
}

impl From<ResolutionError> for AppError {
    fn from(err: ResolutionError) -> Self {
        match err {
            ResolutionError::InvalidFormat(inner) => Self::from(inner),
            exhausted @ ResolutionError::Exhausted { .. } => {
                Self::not_found(&exhausted.to_string())
            }
        }
    }
}

impl From<FetchError> for AppError {
    fn from(err: FetchError) -> Self {
        match err {
            // Transport messages can carry upstream host details.
            FetchError::Transport { .. } => Self {
                status: StatusCode::BAD_GATEWAY,
                message: format!("financial API unreachable: {}", err.endpoint()),
                internal: Some(anyhow::Error::new(err)),
            },
            other => Self::new(StatusCode::BAD_GATEWAY, &other.to_string()),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::MissingToken => Self::new(StatusCode::SERVICE_UNAVAILABLE, &err.to_string()),
            other => Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: String::from("configuration error"),
                internal: Some(anyhow::Error::new(other)),
            },
        }
    }
}
