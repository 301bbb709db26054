pub mod config;
pub mod routes;

use myanmatch_shared::clients::rabbitmq::RabbitMQClient;

pub struct AppState {
    pub config: config::AppConfig,
    pub http_client: reqwest::Client,
    pub redis: tokio::sync::Mutex<redis::aio::ConnectionManager>,
    pub rabbitmq: RabbitMQClient,
    pub metrics_handle: metrics_exporter_prometheus::PrometheusHandle,
}
