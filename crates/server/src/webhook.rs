//! `GET|POST /webhook`.
//!
//! GET answers Meta's subscribe handshake. POST relays the first text message
//! of a delivery and always acknowledges with 200 so Meta never redelivers;
//! 403 on a failed handshake is the only non-200 answer this endpoint gives.

use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use pricewire_core::{MessageRelay, RelayContext, RelayOutcome};
use pricewire_whatsapp::{
    extract_first_message,
    verification::{RejectReason, VERIFICATION_FAILED},
    verify_subscription, Verification, VerificationQuery,
};
use secrecy::SecretString;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

pub const STATUS_OK: &str = "ok";
pub const STATUS_NO_MESSAGES: &str = "no messages";

#[derive(Clone)]
pub struct WebhookState {
    relay: MessageRelay,
    verify_token: SecretString,
}

impl WebhookState {
    pub fn new(relay: MessageRelay, verify_token: SecretString) -> Self {
        Self { relay, verify_token }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WebhookAck {
    pub status: &'static str,
}

pub fn router(state: WebhookState) -> Router {
    Router::new().route("/webhook", get(verify).post(receive)).with_state(state)
}

pub async fn verify(
    State(state): State<WebhookState>,
    query: Result<Query<VerificationQuery>, QueryRejection>,
) -> (StatusCode, String) {
    let verification = match query {
        Ok(Query(query)) => verify_subscription(&query, &state.verify_token),
        // Duplicate or undecodable hub.* parameters cannot match the token.
        Err(_) => Verification::Rejected(RejectReason::TokenMismatch),
    };

    match verification {
        Verification::Accepted { challenge } => {
            info!(
                event_name = "ingress.webhook.verified",
                correlation_id = "verification",
                "webhook subscription verified"
            );
            (StatusCode::OK, challenge)
        }
        Verification::Rejected(reason) => {
            info!(
                event_name = "ingress.webhook.verification_rejected",
                correlation_id = "verification",
                reason = reason.as_str(),
                "webhook verification failed"
            );
            (StatusCode::FORBIDDEN, VERIFICATION_FAILED.to_owned())
        }
    }
}

pub async fn receive(
    State(state): State<WebhookState>,
    body: Result<Bytes, BytesRejection>,
) -> (StatusCode, Json<WebhookAck>) {
    // Oversized or interrupted bodies are acknowledged like any other bad delivery.
    let body = match body {
        Ok(body) => body,
        Err(rejection) => {
            warn!(
                event_name = "ingress.webhook.malformed",
                correlation_id = "unknown",
                rejection_status = rejection.status().as_u16(),
                error = %rejection.body_text(),
                "webhook body could not be buffered; acknowledging anyway"
            );
            return ack(STATUS_OK);
        }
    };

    let message = match extract_first_message(&body) {
        Ok(Some(message)) => message,
        Ok(None) => {
            info!(
                event_name = "ingress.webhook.no_messages",
                correlation_id = "unknown",
                "webhook delivery carried no messages"
            );
            return ack(STATUS_NO_MESSAGES);
        }
        Err(error) => {
            warn!(
                event_name = "ingress.webhook.malformed",
                correlation_id = "unknown",
                body_bytes = body.len(),
                error = %error,
                "webhook delivery could not be read; acknowledging anyway"
            );
            return ack(STATUS_OK);
        }
    };

    let correlation_id =
        message.message_id.clone().unwrap_or_else(|| Uuid::new_v4().to_string());
    info!(
        event_name = "ingress.webhook.message_received",
        correlation_id = %correlation_id,
        "received inbound message"
    );

    let outcome = state.relay.relay(&message, &RelayContext { correlation_id: correlation_id.clone() }).await;
    let outcome_label = match &outcome {
        RelayOutcome::Replied { delivery: Ok(_), .. } => "replied",
        RelayOutcome::Replied { delivery: Err(_), .. } => "reply_failed",
        RelayOutcome::SkippedMissingSender => "skipped",
    };
    info!(
        event_name = "ingress.webhook.processed",
        correlation_id = %correlation_id,
        outcome = outcome_label,
        "webhook delivery processed"
    );

    ack(STATUS_OK)
}

fn ack(status: &'static str) -> (StatusCode, Json<WebhookAck>) {
    (StatusCode::OK, Json(WebhookAck { status }))
}
