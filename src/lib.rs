pub mod api;
pub mod config;
pub mod datasource;
pub mod dispatcher;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod normalizer;
pub mod render;

pub use error::{DashboardError, Result};
