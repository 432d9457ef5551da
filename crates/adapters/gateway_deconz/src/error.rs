//! Gateway-specific error type wrapping HTTP failures and deCONZ rejections.

use wakelamp_domain::error::WakeLampError;

/// Errors originating from the deCONZ REST client.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The request could not be sent or its body could not be decoded.
    #[error("http error")]
    Http(#[from] reqwest::Error),

    /// The gateway answered with a non-success status.
    #[error("gateway answered {status}: {description}")]
    Status { status: u16, description: String },

    /// The gateway accepted the request but reported an error entry.
    #[error("gateway rejected request: {0}")]
    Rejected(String),
}

impl From<GatewayError> for WakeLampError {
    fn from(err: GatewayError) -> Self {
        Self::Gateway(Box::new(err))
    }
}
