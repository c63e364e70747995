use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A mandatory client field was left empty.
    #[error("the '{0}' field is required")]
    MissingField(&'static str),

    #[error("unrecognized field '{0}'")]
    UnknownField(String),

    #[error("the code '{0}' is already in use by another client")]
    DuplicateCode(String),

    #[error("load or register a client before working with its tasks")]
    NoActiveClient,

    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode client data: {0}")]
    Json(#[from] serde_json::Error),
}
