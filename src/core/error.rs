use thiserror::Error;

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("endpoint must not be empty")]
    EmptyEndpoint,

    #[error("request failed: {0}")]
    Failed(String),
}
