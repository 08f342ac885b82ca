//! BasketLab Client — everything that talks to the backtest service.
//!
//! This crate builds on `basketlab-core` to provide:
//! - The `BacktestService` trait and its blocking HTTP implementation
//! - Joint catalog loading with per-half degradation
//! - A synchronous run session used by the CLI
//! - TOML configuration layered with env and flags

pub mod config;
pub mod error;
pub mod loader;
pub mod service;
pub mod session;

pub use config::{default_config_path, ClientConfig, ConfigError, API_URL_ENV, DEFAULT_API_URL};
pub use error::ServiceError;
pub use loader::{fetch_catalog, load_catalog, CatalogFetch, CatalogPart, LoadReport};
pub use service::{BacktestService, HttpService};
pub use session::{RunError, RunReport, Session};
