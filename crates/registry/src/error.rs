use thiserror::Error;

pub type Result<T> = std::result::Result<T, RegistryError>;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("registry file is not valid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("failed to persist registry: {0}")]
    Persist(String),
}
