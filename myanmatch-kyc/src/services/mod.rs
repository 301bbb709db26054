pub mod snapshot;
pub mod user_client;
