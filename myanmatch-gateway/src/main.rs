use axum::http::{header, Method};
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;

use myanmatch_gateway::config::AppConfig;
use myanmatch_gateway::routes::{auth, health, proxy};
use myanmatch_gateway::AppState;
use myanmatch_shared::clients::jwks::{init_jwt_verifier, JwtVerifier};
use myanmatch_shared::clients::rabbitmq::RabbitMQClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    myanmatch_shared::middleware::init_tracing("myanmatch-gateway");

    let config = AppConfig::load()?;
    let port = config.port;

    init_jwt_verifier(
        JwtVerifier::connect(&config.jwks_url, config.impersonation_secret.clone()).await,
    );

    // Connect to Redis
    let redis_client = redis::Client::open(config.redis_url.as_str())?;
    let redis_conn = redis_client.get_connection_manager().await?;
    tracing::info!(url = %config.redis_url, "connected to Redis");

    let rabbitmq = RabbitMQClient::connect(&config.rabbitmq_url).await?;

    // Initialize Prometheus metrics
    let metrics_handle = myanmatch_shared::middleware::init_metrics();

    // Build HTTP client for upstream proxying
    let http_client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()?;

    let state = Arc::new(AppState {
        config,
        http_client,
        redis: tokio::sync::Mutex::new(redis_conn),
        rabbitmq,
        metrics_handle,
    });

    let app = Router::new()
        .route("/health", get(health::health_check))
        .route("/metrics", get(health::metrics))
        .route("/api/auth/me", get(auth::me))
        .fallback(proxy::proxy_handler)
        .layer(
            CorsLayer::new()
                .allow_origin([
                    "http://localhost:3000".parse().unwrap(),
                    "http://127.0.0.1:3000".parse().unwrap(),
                ])
                .allow_methods(AllowMethods::list([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ]))
                .allow_headers(AllowHeaders::list([
                    header::AUTHORIZATION,
                    header::CONTENT_TYPE,
                    header::ACCEPT,
                ]))
                .allow_credentials(true),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "myanmatch-gateway starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
