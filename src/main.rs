use credit_report_api::config::Config;
use credit_report_api::db::Database;
use credit_report_api::handlers::AppState;
use credit_report_api::normalizer::ReportNormalizer;
use credit_report_api::routes;
use credit_report_api::xml_reader::ReaderOptions;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the application.
///
/// Initializes tracing, configuration and the database (creating the report
/// schema when missing), then serves the upload API.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "credit_report_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let db = Database::new(&config.database_url).await?;
    tracing::info!("Database connection pool established");

    let reader_options = ReaderOptions::default();
    tracing::debug!("XML reader options: {:?}", reader_options);

    let app_state = Arc::new(AppState {
        db: db.pool.clone(),
        config: config.clone(),
        normalizer: ReportNormalizer::new(reader_options),
    });

    // Rate limiting: 10 requests/second per IP, burst of 20
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(10)
            .burst_size(20)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .ok_or_else(|| anyhow::anyhow!("Invalid rate limiter configuration"))?,
    );

    let api = routes::api_routes(config.max_file_size).layer(ServiceBuilder::new().layer(
        GovernorLayer {
            config: governor_conf,
        },
    ));

    // Health check bypasses rate limiting
    let app = routes::build_app(app_state, api);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await?;

    Ok(())
}
