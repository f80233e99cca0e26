//! # Campus Lost & Found Library
//!
//! 校园失物招领登记系统核心库

pub mod api;
pub mod app;
pub mod audit;
pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod logging;
pub mod uploads;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{RegistryError, Result};
