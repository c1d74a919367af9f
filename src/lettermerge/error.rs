use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum MergeError {
    #[error("Record not found: {0}")]
    RecordNotFound(Uuid),

    #[error("Category not found: {0}")]
    CategoryNotFound(String),

    #[error("Category '{0}' is built in and cannot be deleted")]
    ProtectedCategory(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Api Error: {0}")]
    Api(String),
}

pub type Result<T> = std::result::Result<T, MergeError>;
