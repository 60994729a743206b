use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

pub const SUBSCRIBE_MODE: &str = "subscribe";
pub const VERIFICATION_FAILED: &str = "Verification failed";

/// Query string of the GET Meta sends when the webhook URL is registered.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct VerificationQuery {
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verification {
    /// Echo `challenge` back unchanged with a 200.
    Accepted { challenge: String },
    Rejected(RejectReason),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RejectReason {
    ModeMismatch,
    TokenMismatch,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ModeMismatch => "mode_mismatch",
            Self::TokenMismatch => "token_mismatch",
        }
    }
}

pub fn verify_subscription(query: &VerificationQuery, expected_token: &SecretString) -> Verification {
    if query.mode.as_deref() != Some(SUBSCRIBE_MODE) {
        return Verification::Rejected(RejectReason::ModeMismatch);
    }

    if query.verify_token.as_deref() != Some(expected_token.expose_secret()) {
        return Verification::Rejected(RejectReason::TokenMismatch);
    }

    Verification::Accepted { challenge: query.challenge.clone().unwrap_or_default() }
}
