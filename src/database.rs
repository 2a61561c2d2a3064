use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

/// Connects and brings the schema up to date.
pub async fn setup_database(db_url: &str) -> anyhow::Result<DatabaseConnection> {
    let mut options = ConnectOptions::new(db_url);
    options.sqlx_logging(false);
    if db_url.starts_with("sqlite::memory:") {
        // Every pooled connection would otherwise see its own empty database.
        options.max_connections(1).min_connections(1);
    }

    let db = Database::connect(options).await?;
    Migrator::up(&db, None).await?;
    Ok(db)
}
