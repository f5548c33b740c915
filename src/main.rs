//! Webhook delivery worker.
//!
//! The engine only persists PENDING delivery attempts; this process drains
//! them: it polls for due attempts, signs and POSTs each payload, and applies
//! the retry backoff until attempts succeed or exhaust their budget.

use log::info;
use service::{config::Config, logging::Logger, AppState};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let config = Config::new();
    Logger::init_logger(&config);

    info!("Starting webhook delivery worker [{}]", config.database_url());

    let db = Arc::new(
        service::init_database(&config)
            .await
            .expect("Failed to connect to the database"),
    );

    let app_state = AppState::new(config, &db);

    if let Err(err) =
        domain::webhook::run_delivery_worker(app_state.db_conn_ref(), &app_state.config).await
    {
        panic!("Webhook delivery worker exited: {err}");
    }
}
