//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{
        db::DbAdapter, file_store::FileSessionStore, support::LoggingSupportDesk,
        weather::SimulatedWeatherAdapter,
    },
    config::Config,
    error::ApiError,
    web::{
        feedback_handler, history_handler, report_handler, rest::ApiDoc, sign_out_handler,
        state::AppState, ws_handler,
    },
};
use axum::{
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use climatech_core::{
    persistence::SESSION_KEY, ports::SessionStore, KeywordClassifier, ReferencePointResolver,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Choose the Session Store ---
    let store: Arc<dyn SessionStore> = match &config.database_url {
        Some(database_url) => {
            info!("Connecting to database...");
            let db_pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(database_url)
                .await?;
            let db_adapter = DbAdapter::new(db_pool);
            info!("Running database migrations...");
            db_adapter.run_migrations().await?;
            info!("Database migrations complete.");
            Arc::new(db_adapter)
        }
        None => {
            tokio::fs::create_dir_all(&config.session_store_dir).await?;
            info!(
                "No DATABASE_URL set; storing snapshots under {}",
                config.session_store_dir.display()
            );
            Arc::new(FileSessionStore::new(config.session_store_dir.clone()))
        }
    };

    let persisted = store.load(SESSION_KEY).await?;
    info!(
        has_snapshot = persisted.is_some(),
        "Session store reachable."
    );

    // --- 3. Initialize Service Adapters ---
    let weather = Arc::new(SimulatedWeatherAdapter::new(config.weather_latency));
    let resolver = Arc::new(match config.resolver_seed {
        Some(seed) => ReferencePointResolver::seeded(seed),
        None => ReferencePointResolver::from_entropy(),
    });

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        config: config.clone(),
        store,
        weather,
        resolver,
        classifier: Arc::new(KeywordClassifier::default()),
        support: Arc::new(LoggingSupportDesk),
    });

    // --- 5. Create the Web Router ---
    let allowed_origin = config
        .allowed_origin
        .parse::<HeaderValue>()
        .map_err(|_| ApiError::InvalidOrigin(config.allowed_origin.clone()))?;
    let cors = CorsLayer::new()
        .allow_origin(allowed_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE]);

    let api_router = Router::new()
        .route("/ws", get(ws_handler))
        .route("/history", get(history_handler))
        .route("/feedback", post(feedback_handler))
        .route("/reports", post(report_handler))
        .route("/sign-out", post(sign_out_handler))
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
