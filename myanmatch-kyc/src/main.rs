use axum::{routing::{get, post}, Router, extract::DefaultBodyLimit};
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod config;
mod events;
mod models;
mod routes;
mod schema;
mod services;

use config::AppConfig;
use myanmatch_shared::clients::jwks::{init_jwt_verifier, JwtVerifier};
use myanmatch_shared::clients::rabbitmq::RabbitMQClient;
use myanmatch_shared::clients::storage::StorageClient;

pub type DbPool = Pool<ConnectionManager<PgConnection>>;

pub struct AppState {
    pub db: DbPool,
    pub config: AppConfig,
    pub rabbitmq: RabbitMQClient,
    pub storage: StorageClient,
    pub http: reqwest::Client,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    myanmatch_shared::middleware::init_tracing("myanmatch-kyc");

    let config = AppConfig::load()?;
    let port = config.port;

    init_jwt_verifier(
        JwtVerifier::connect(&config.jwks_url, config.impersonation_secret.clone()).await,
    );

    let manager = ConnectionManager::<PgConnection>::new(&config.database_url);
    let db = Pool::builder().max_size(10).build(manager)?;

    let rabbitmq = RabbitMQClient::connect(&config.rabbitmq_url).await?;
    let storage = StorageClient::new(
        &config.storage_endpoint,
        &config.storage_access_key,
        &config.storage_secret_key,
        &config.storage_public_url,
    )
    .await;

    let state = Arc::new(AppState {
        db,
        config,
        rabbitmq,
        storage,
        http: reqwest::Client::new(),
    });

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route(
            "/kyc",
            post(routes::kyc::submit_request)
                .layer(DefaultBodyLimit::max(20 * 1024 * 1024)),
        )
        .route("/kyc/status", get(routes::kyc::get_status))
        .route("/admin/kyc", get(routes::admin::list_requests))
        .route("/admin/kyc/:id/decision", post(routes::admin::decide_request))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "myanmatch-kyc starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
