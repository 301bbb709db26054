use axum::{routing::{get, patch, post}, Router, extract::DefaultBodyLimit};
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
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    myanmatch_shared::middleware::init_tracing("myanmatch-wallet");

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

    let state = Arc::new(AppState { db, config, rabbitmq, storage });

    // Wallet lifecycle follows user lifecycle events
    let sub_state = state.clone();
    tokio::spawn(async move {
        if let Err(e) = events::subscriber::listen_user_lifecycle(sub_state).await {
            tracing::error!(error = %e, "user lifecycle subscriber failed");
        }
    });

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/wallet", get(routes::wallet::get_wallet))
        .route(
            "/wallet/deposits",
            post(routes::wallet::create_deposit)
                .layer(DefaultBodyLimit::max(10 * 1024 * 1024)),
        )
        .route("/wallet/withdrawals", post(routes::wallet::create_withdrawal))
        .route("/market/gifts", get(routes::market::list_gifts))
        .route("/market/gifts/received", get(routes::market::received_gifts))
        .route("/market/swaps", post(routes::market::create_swap))
        // Admin surface
        .route("/admin/wallet/transactions", get(routes::admin::list_transactions))
        .route("/admin/wallet/deposits/:id/approve", post(routes::admin::approve_deposit))
        .route("/admin/wallet/deposits/:id/reject", post(routes::admin::reject_deposit))
        .route("/admin/wallet/withdrawals/:id/approve", post(routes::admin::approve_withdrawal))
        .route("/admin/wallet/withdrawals/:id/reject", post(routes::admin::reject_withdrawal))
        .route("/admin/market/gifts", post(routes::admin::create_gift))
        .route("/admin/market/gifts/:id", patch(routes::admin::update_gift))
        .route(
            "/admin/market/gifts/:id/image",
            post(routes::admin::upload_gift_image)
                .layer(DefaultBodyLimit::max(5 * 1024 * 1024)),
        )
        // Internal service-to-service endpoints (no auth)
        .route("/internal/coins/debit", post(routes::internal::debit_coins))
        .route("/internal/coins/credit", post(routes::internal::credit_coins))
        .route("/internal/gifts/send", post(routes::internal::send_gift))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "myanmatch-wallet starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
