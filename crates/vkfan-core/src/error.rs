use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid route: {0}")]
    InvalidRoute(String),
    #[error("'{param}' is not a multi-id parameter of {entity}")]
    UnknownParameter { entity: String, param: String },
    #[error("invalid params: {0}")]
    InvalidParams(String),
    #[error("no credentials configured")]
    EmptyCredentials,
}
