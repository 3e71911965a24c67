pub mod commands;
pub mod config;

pub use config::AppConfig;
