use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("messaging transport failed: {0}")]
    Transport(String),
    #[error("messaging platform rejected the message with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

impl DeliveryError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport(_) => None,
            Self::Rejected { status, .. } => Some(*status),
        }
    }
}
