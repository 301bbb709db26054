use axum::{routing::{get, post}, Router, extract::DefaultBodyLimit};
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod config;
mod events;
mod feed;
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
    myanmatch_shared::middleware::init_tracing("myanmatch-user");

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

    // Event subscribers: profile creation + welcome likes, moderation flags
    let sub_state = state.clone();
    tokio::spawn(async move {
        if let Err(e) = events::subscriber::listen_user_registered(sub_state).await {
            tracing::error!(error = %e, "user.registered subscriber failed");
        }
    });
    let sub_state = state.clone();
    tokio::spawn(async move {
        if let Err(e) = events::subscriber::listen_moderation_events(sub_state).await {
            tracing::error!(error = %e, "moderation subscriber failed");
        }
    });

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route(
            "/me",
            get(routes::profile::get_profile)
                .patch(routes::profile::update_profile)
                .delete(routes::profile::delete_account),
        )
        .route("/onboarding", post(routes::profile::complete_onboarding))
        .route(
            "/onboarding/voice",
            post(routes::media::upload_voice_prompt)
                .layer(DefaultBodyLimit::max(10 * 1024 * 1024)),
        )
        .route(
            "/media",
            post(routes::media::upload_photo)
                .layer(DefaultBodyLimit::max(10 * 1024 * 1024)),
        )
        .route(
            "/preferences",
            get(routes::preferences::get_preferences).put(routes::preferences::update_preferences),
        )
        .route("/feed", get(routes::feed::get_feed))
        .route("/likes", post(routes::likes::send_like))
        .route("/likes/received", get(routes::likes::received_likes))
        .route("/likes/:id/hide", post(routes::likes::hide_like))
        .route("/passes", post(routes::passes::send_pass))
        .route("/boost", post(routes::boost::activate_boost))
        .route("/profile/:id", get(routes::profile::get_public_profile))
        // Internal service-to-service endpoints (no auth)
        .route("/internal/profiles/batch", post(routes::internal::batch_profiles))
        .route("/internal/profiles/:id", get(routes::internal::get_profile))
        .route("/internal/profiles", get(routes::internal::list_profiles))
        .route("/internal/verify/:id", post(routes::internal::mark_verified))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "myanmatch-user starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
