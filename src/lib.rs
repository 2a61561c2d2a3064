pub mod config;
pub mod database;
pub mod entities;
pub mod error;
pub mod impact;
pub mod import;
pub mod router;
pub mod routes;
pub mod slides;
pub mod store;
pub mod util;
