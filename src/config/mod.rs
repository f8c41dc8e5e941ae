pub mod defaults;
pub mod types;

pub use types::*;

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to access config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("config file already exists: {}", .0.display())]
    AlreadyExists(PathBuf),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
