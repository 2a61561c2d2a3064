use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, get_service, post},
};
use minijinja::Environment;
use sea_orm::DatabaseConnection;
use tokio::signal;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::{
    impact::ImpactConstants,
    routes::{donors, health, impact, imports, segmentation, volunteers, wrapped},
    util::asset_loader::AssetLoader,
};

const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub constants: ImpactConstants,
    pub templates: Arc<Environment<'static>>,
}

impl AppState {
    pub fn new(
        db: DatabaseConnection,
        constants: ImpactConstants,
        template_dir: &str,
        static_dir: &str,
    ) -> Self {
        Self {
            db,
            constants,
            templates: Arc::new(setup_templates(template_dir, static_dir)),
        }
    }
}

pub fn create_router(state: AppState, static_dir: &str) -> Router {
    let api = Router::new()
        .route(
            "/calculate-impact",
            get(impact::calculate_impact_query).post(impact::calculate_impact_body),
        )
        .route(
            "/calculate-volunteer-impact",
            get(impact::calculate_volunteer_impact_query)
                .post(impact::calculate_volunteer_impact_body),
        )
        .route("/log-volunteer-shift", post(volunteers::log_volunteer_shift))
        .route("/volunteer/{identifier}", get(volunteers::get_volunteer))
        .route("/donations", post(donors::record_donation))
        .route("/donor/{identifier}", get(donors::get_donor))
        .route(
            "/import/excel",
            post(imports::import_excel).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/segmentation", post(segmentation::create_segment));

    Router::new()
        .nest("/api", api)
        .route("/wrapped/{kind}", get(wrapped::wrapped))
        .route("/health", get(health::health))
        .route("/ping", get(health::ping))
        .with_state(state)
        .nest_service("/static", get_service(ServeDir::new(static_dir)))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn setup_templates(template_dir: &str, static_dir: &str) -> Environment<'static> {
    let mut env = Environment::new();
    env.set_loader(minijinja::path_loader(template_dir));
    AssetLoader::new(static_dir).register(&mut env);
    env
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutting down");
}
