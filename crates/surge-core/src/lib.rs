pub mod config;
pub mod types;

pub use config::{MonitorConfig, ServerConfig, SurgeConfig, parse_duration};
pub use types::*;
