use thiserror::Error;

#[derive(Error, Debug)]
pub enum BattlefieldError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Missing parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Unknown strategy '{0}' (expected strongest, weakest or random)")]
    UnknownStrategy(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BattlefieldError>;
