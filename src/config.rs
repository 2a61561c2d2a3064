use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub rust_log: String,
    pub bind_addr: String,
    pub template_dir: String,
    pub static_dir: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL is not set in .env file"))?;
        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "impact_wrapped=debug,tower_http=info".into());
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
        let template_dir = env::var("TEMPLATE_DIR").unwrap_or_else(|_| "templates".into());
        let static_dir = env::var("STATIC_DIR").unwrap_or_else(|_| "static".into());

        Ok(Self {
            database_url,
            rust_log,
            bind_addr,
            template_dir,
            static_dir,
        })
    }
}
