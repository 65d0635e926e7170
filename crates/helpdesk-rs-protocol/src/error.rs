/// Errors returned by generative provider calls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// The request never produced an HTTP response.
    #[error("transport error: {0}")]
    Transport(String),
    /// Provider answered with a non-success status.
    #[error("provider returned {status}: {message}")]
    Api { status: u16, message: String },
    /// Response body could not be decoded.
    #[error("failed to decode provider response: {0}")]
    Decode(String),
    /// Request was rejected before it was sent.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}
