use impact_wrapped::{
    config::Config,
    database::setup_database,
    impact::ImpactConstants,
    router::{AppState, create_router, shutdown_signal},
};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.rust_log))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let db = setup_database(&config.database_url).await?;

    let constants = ImpactConstants::default();
    constants.validate()?;

    let state = AppState::new(db, constants, &config.template_dir, &config.static_dir);
    let app = create_router(state, &config.static_dir);

    let listener = TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Listening on {}", config.bind_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
