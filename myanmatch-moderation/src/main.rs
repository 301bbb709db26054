use axum::{routing::{get, post}, Router};
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

use config::AppConfig;
use myanmatch_shared::clients::jwks::{init_jwt_verifier, JwtVerifier};
use myanmatch_shared::clients::rabbitmq::RabbitMQClient;

pub type DbPool = Pool<ConnectionManager<PgConnection>>;

pub struct AppState {
    pub db: DbPool,
    pub config: AppConfig,
    pub rabbitmq: RabbitMQClient,
    pub http: reqwest::Client,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    myanmatch_shared::middleware::init_tracing("myanmatch-moderation");

    let config = AppConfig::load()?;
    let port = config.port;

    init_jwt_verifier(
        JwtVerifier::connect(&config.jwks_url, config.impersonation_secret.clone()).await,
    );

    let manager = ConnectionManager::<PgConnection>::new(&config.database_url);
    let db = Pool::builder().max_size(10).build(manager)?;

    let rabbitmq = RabbitMQClient::connect(&config.rabbitmq_url).await?;

    let state = Arc::new(AppState {
        db,
        config,
        rabbitmq,
        http: reqwest::Client::new(),
    });

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/report", post(routes::user_routes::create_report))
        // Admin surface
        .route("/admin/reports", get(routes::admin_routes::list_reports))
        .route("/admin/reports/:id", get(routes::admin_routes::get_report))
        .route("/admin/reports/:id/review", post(routes::admin_routes::review_report))
        .route("/admin/users", get(routes::admin_routes::list_users))
        .route("/admin/users/:id/block", post(routes::admin_routes::block_user))
        .route("/admin/users/:id/release", post(routes::admin_routes::release_user))
        .route("/admin/users/:id/magic-link", post(routes::admin_routes::create_magic_link))
        .route("/admin/stats", get(routes::admin_routes::get_stats))
        .route("/admin/audit-log", get(routes::admin_routes::get_audit_log))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "myanmatch-moderation starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
