//! Outbound collaborators of the relay. Both are trait objects so the webhook
//! can run against the real HTTP clients or against in-memory fakes.

use async_trait::async_trait;

use crate::domain::{quote::Price, symbol::Symbol};
use crate::errors::DeliveryError;

#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Latest price for `symbol`, or `None` when the provider has no usable
    /// price or could not be reached. Implementations log their own failures.
    async fn latest_price(&self, symbol: &Symbol) -> Option<Price>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeliveryReceipt {
    pub status: u16,
    pub message_id: Option<String>,
}

#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send_text(
        &self,
        recipient: &str,
        body: &str,
    ) -> Result<DeliveryReceipt, DeliveryError>;
}
