pub mod config;

pub use config::{AppConfig, BlendConfig, ServerConfig};
