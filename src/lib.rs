pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod oracle;
pub mod service;

pub use config::AppConfig;
pub use db::{create_pool, DocumentStore, PgStore};
pub use oracle::{ComparisonOracle, LlmOracle};
pub use service::{DocumentService, MatchingService};
