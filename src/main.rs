use axum::{
    routing::{get, post},
    Router,
};
use freight_recon::api::handlers::{self, AppState};
use freight_recon::service::spawn_matching_worker;
use freight_recon::{
    create_pool, AppConfig, ComparisonOracle, DocumentService, DocumentStore, LlmOracle,
    MatchingService, PgStore,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .init();

    let config = AppConfig::from_env();
    info!(
        host = %config.server.host,
        port = config.server.port,
        oracle_model = %config.oracle.model,
        fuzzy_fallback = config.matching.fuzzy_fallback,
        "starting freight-recon"
    );

    let pool = create_pool(&config.database.url).await?;
    info!("Database pool created");

    let store: Arc<dyn DocumentStore> = Arc::new(PgStore::new(pool));
    let oracle: Arc<dyn ComparisonOracle> = Arc::new(LlmOracle::new(config.oracle.clone()));

    let documents = Arc::new(DocumentService::new(store.clone()));
    let matching = Arc::new(MatchingService::new(
        store,
        oracle,
        config.matching.clone(),
    ));
    let queue = spawn_matching_worker(matching.clone());

    let state = AppState {
        documents,
        matching,
        queue,
    };

    let app = Router::new()
        .route("/health", get(handlers::health_check))
        .route(
            "/api/purchase-orders",
            post(handlers::create_po).get(handlers::list_pos),
        )
        .route("/api/bols", post(handlers::create_bol))
        .route("/api/bols/:id/pod", post(handlers::attach_pod))
        .route(
            "/api/invoices",
            post(handlers::create_invoice).get(handlers::list_invoices),
        )
        .route("/api/invoices/:id/approve", post(handlers::approve_invoice))
        .route(
            "/api/invoices/:id/matching-result",
            get(handlers::latest_result_for_invoice),
        )
        .route("/api/files", post(handlers::register_file))
        .route("/api/match/run", post(handlers::run_match))
        .route("/api/matching-results", get(handlers::list_matching_results))
        .route(
            "/api/matching-results/export",
            get(handlers::export_matching_results),
        )
        .layer(ServiceBuilder::new())
        .with_state(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  POST /api/purchase-orders  - PO intake");
    info!("  POST /api/bols             - BOL intake");
    info!("  POST /api/invoices         - invoice intake (enqueues matching)");
    info!("  POST /api/match/run        - manual matching trigger");
    info!("  GET  /api/matching-results - reconciliation results");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
