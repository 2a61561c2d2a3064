use std::path::Path;

use anyhow::Context;
use impact_wrapped::{
    config::Config,
    database::setup_database,
    import::{import_rows, read_rows},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let path = std::env::args()
        .nth(1)
        .context("usage: import_excel <path to .xlsx, .csv or .json>")?;

    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.rust_log))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let bytes = tokio::fs::read(&path)
        .await
        .with_context(|| format!("could not read {path}"))?;
    let filename = Path::new(&path)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(&path);
    let rows = read_rows(filename, &bytes)?;

    let db = setup_database(&config.database_url).await?;
    let result = import_rows(&db, rows).await;

    println!("Import of {filename} complete");
    println!("  rows with email:      {}", result.total);
    println!("  successful:           {}", result.successful);
    println!("  failed:               {}", result.failed);
    println!("  skipped (no email):   {}", result.skipped_without_email);
    println!("  donors created:       {}", result.donors_created);
    println!("  donors updated:       {}", result.donors_updated);
    println!("  donations created:    {}", result.donations_created);
    println!("  already imported:     {}", result.donations_already_imported);
    for error in &result.errors {
        println!("  {error}");
    }

    Ok(())
}
