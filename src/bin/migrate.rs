use log::info;
use migration::{Migrator, MigratorTrait};
use service::{config::Config, logging::Logger};

#[tokio::main]
async fn main() {
    let config = Config::new();
    Logger::init_logger(&config);

    info!("Applying migrations to [{}]...", config.database_url());

    let db = service::init_database(&config)
        .await
        .expect("Failed to connect to the database");

    Migrator::up(&db, None).await.expect("Migration failed");

    info!("Migrations applied");
}
