/// Errors that can occur while sending or receiving JSON messages.
#[derive(Debug, thiserror::Error)]
pub enum JsonFrameError {
    /// The value cannot be sent as a message.
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// An inbound payload is not valid JSON for the requested type.
    #[error("invalid payload: {0}")]
    Json(#[from] serde_json::Error),

    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] lenframe_frame::FrameError),

    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] lenframe_transport::TransportError),
}

impl JsonFrameError {
    /// Whether the stream is still usable after this error.
    ///
    /// Bad payloads and rejected outbound values leave framing intact.
    pub fn is_recoverable(&self) -> bool {
        match self {
            JsonFrameError::InvalidMessage(_) | JsonFrameError::Json(_) => true,
            JsonFrameError::Frame(err) => matches!(
                err,
                lenframe_frame::FrameError::PayloadTooLarge { .. }
                    | lenframe_frame::FrameError::FrameTooLarge { .. }
            ),
            JsonFrameError::Transport(_) => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, JsonFrameError>;
