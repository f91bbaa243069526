use thiserror::Error;

#[derive(Error, Debug)]
pub enum FvtError {
    #[error("Could not create visibility field on layer {layer}: {reason}")]
    FieldCreation { layer: String, reason: String },

    #[error("Visibility field is missing on layer {0}")]
    FieldMissing(String),

    #[error("Layer {0} is already being edited")]
    EditConflict(String),

    #[error("Host query failed: {0}")]
    HostQuery(String),

    #[error("Layer not found: {0}")]
    LayerNotFound(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("Config error: {0}")]
    Config(#[from] confique::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FvtError>;
