use hostbridge_schema::ValidationError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unknown operation: {0}")]
    UnknownOperation(String),

    #[error("native entry point {native} for {operation} is not available")]
    MissingEntryPoint {
        operation: &'static str,
        native: &'static str,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Runtime(#[from] hostbridge_runtime::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
