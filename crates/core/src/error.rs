#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("failed to compile schema: {0}")]
    SchemaCompile(String),
    #[error("failed to read schema file: {0}")]
    SchemaRead(std::io::Error),
    #[error("schema file is not valid JSON: {0}")]
    SchemaParse(serde_json::Error),
    #[error("failed to serialize share payload: {0}")]
    Serialization(serde_json::Error),
    #[error("share payload is not valid base64: {0}")]
    ShareDecode(base64::DecodeError),
    #[error("share payload is not valid JSON: {0}")]
    Deserialization(serde_json::Error),
    #[error("record error: {0}")]
    Record(#[from] records::RecordError),
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
