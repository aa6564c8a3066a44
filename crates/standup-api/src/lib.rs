pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;

pub use error::ApiError;

use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::get,
    Router,
};
use sea_orm::DatabaseConnection;
use standup_core::StandupError;
use std::{net::SocketAddr, sync::Arc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Application state shared across handlers
pub struct AppState {
    pub db: DatabaseConnection,
    /// Include internal error detail in 500 responses
    pub diagnostics: bool,
    /// Upper bound on report cells (teams × users × questions × dates)
    pub max_report_cells: Option<usize>,
}

impl AppState {
    pub fn error(&self, err: StandupError) -> ApiError {
        ApiError::new(err, self.diagnostics)
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Standup API",
        version = "0.1.0",
        description = "REST API for daily team status updates and status reports",
        contact(
            name = "Standup Team",
            email = "team@standup.dev"
        )
    ),
    paths(
        handlers::health_check,
        handlers::submit_status,
        handlers::list_statuses,
        handlers::check_eligibility,
        handlers::list_questions,
        handlers::export_report,
    ),
    components(
        schemas(
            models::HealthResponse,
            models::ErrorResponse,
            models::AnswerInput,
            models::SubmitStatusRequest,
            models::SubmitOutcome,
            models::ResponseView,
            models::StatusRecordView,
            models::SubmitStatusResponse,
            models::StatusRecordList,
            models::StatusQuery,
            models::EligibilityQuery,
            models::EligibilityResponse,
            models::QuestionQuery,
            models::QuestionView,
            models::QuestionList,
            models::ExportQuery,
            standup_core::SheetFormat,
            standup_core::Role,
            standup_core::Answer,
        )
    ),
    tags(
        (name = "statuses", description = "Daily status submission and lookup"),
        (name = "questions", description = "Submission form questions"),
        (name = "reports", description = "Status report export"),
        (name = "system", description = "System health and info endpoints")
    )
)]
struct ApiDoc;

/// API server configuration
pub struct ApiServerConfig {
    /// Address to bind the API server
    pub bind_addr: SocketAddr,
    /// Enable CORS for local development origins
    pub enable_cors: bool,
    /// Secret for validating bearer tokens
    pub jwt_secret: String,
    /// Include internal error detail in 500 responses
    pub diagnostics: bool,
    /// Upper bound on report cells
    pub max_report_cells: Option<usize>,
}

impl Default for ApiServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3080)),
            enable_cors: false,
            jwt_secret: String::new(),
            diagnostics: false,
            max_report_cells: None,
        }
    }
}

/// API Server
pub struct ApiServer {
    config: ApiServerConfig,
    state: Arc<AppState>,
}

impl ApiServer {
    /// Create a new API server
    pub fn new(config: ApiServerConfig, db: DatabaseConnection) -> Self {
        let state = Arc::new(AppState {
            db,
            diagnostics: config.diagnostics,
            max_report_cells: config.max_report_cells,
        });

        Self { config, state }
    }

    /// Build the router with all routes
    pub fn build_router(&self) -> Router {
        // Get the OpenAPI spec
        let api_doc = ApiDoc::openapi();

        let jwt_state = Arc::new(middleware::JwtState::new(
            self.config.jwt_secret.as_bytes(),
        ));

        // Build PUBLIC routes (no authentication required)
        let public_router = Router::new()
            .route("/api/health", get(handlers::health_check))
            .with_state(self.state.clone());

        // Build PROTECTED routes (require bearer token authentication)
        let protected_router = Router::new()
            .route(
                "/api/statuses",
                get(handlers::list_statuses).post(handlers::submit_status),
            )
            .route(
                "/api/statuses/eligibility",
                get(handlers::check_eligibility),
            )
            .route("/api/questions", get(handlers::list_questions))
            .route("/api/reports/export", get(handlers::export_report))
            .with_state(self.state.clone())
            .layer(axum_middleware::from_fn_with_state(
                jwt_state,
                middleware::require_auth,
            ));

        // Merge public and protected routers
        let api_router = public_router.merge(protected_router);

        // SwaggerUi automatically creates a route for /api/openapi.json
        let router = Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api/openapi.json", api_doc))
            .merge(api_router);

        // Configure CORS
        let cors = if self.config.enable_cors {
            use tower_http::cors::AllowOrigin;

            let cors_layer = CorsLayer::new()
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
                .expose_headers([header::CONTENT_DISPOSITION])
                .allow_origin(AllowOrigin::predicate(|origin: &HeaderValue, _| {
                    // Allow common development origins
                    let origin_str = origin.to_str().unwrap_or("");
                    origin_str.starts_with("http://localhost:")
                        || origin_str.starts_with("http://127.0.0.1:")
                        || origin_str.starts_with("https://localhost:")
                        || origin_str.starts_with("https://127.0.0.1:")
                }));

            Some(cors_layer)
        } else {
            None
        };

        // Build middleware stack
        let mut router = router.layer(TraceLayer::new_for_http());

        if let Some(cors) = cors {
            router = router.layer(cors);
        }

        router
    }

    /// Start the API server
    pub async fn start(self) -> Result<(), anyhow::Error> {
        let router = self.build_router();

        info!("Starting API server on {}", self.config.bind_addr);
        info!(
            "OpenAPI spec: http://{}/api/openapi.json",
            self.config.bind_addr
        );
        info!("Swagger UI: http://{}/swagger-ui", self.config.bind_addr);

        let listener = tokio::net::TcpListener::bind(self.config.bind_addr).await?;

        axum::serve(listener, router)
            .await
            .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

        Ok(())
    }
}
