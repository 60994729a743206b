use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::{message::InboundMessage, reply::Reply, symbol::Symbol};
use crate::errors::DeliveryError;
use crate::ports::{DeliveryReceipt, MessageSender, QuoteProvider};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelayContext {
    pub correlation_id: String,
}

impl Default for RelayContext {
    fn default() -> Self {
        Self { correlation_id: "unknown-correlation-id".to_owned() }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum RelayOutcome {
    Replied {
        symbol: Symbol,
        reply: Reply,
        delivery: Result<DeliveryReceipt, DeliveryError>,
    },
    /// The message had no sender id, so there is nobody to answer.
    SkippedMissingSender,
}

impl RelayOutcome {
    pub fn delivered(&self) -> bool {
        matches!(self, Self::Replied { delivery: Ok(_), .. })
    }
}

/// Turns one inbound message into one price reply.
///
/// Lookup and send run sequentially; neither failure escapes as an error.
#[derive(Clone)]
pub struct MessageRelay {
    quotes: Arc<dyn QuoteProvider>,
    sender: Arc<dyn MessageSender>,
}

impl MessageRelay {
    pub fn new(quotes: Arc<dyn QuoteProvider>, sender: Arc<dyn MessageSender>) -> Self {
        Self { quotes, sender }
    }

    pub async fn relay(&self, message: &InboundMessage, ctx: &RelayContext) -> RelayOutcome {
        if !message.has_sender() {
            warn!(
                event_name = "relay.message.skipped",
                correlation_id = %ctx.correlation_id,
                "inbound message has no sender id; nothing to reply to"
            );
            return RelayOutcome::SkippedMissingSender;
        }

        let symbol = Symbol::from_message_text(&message.text);
        let price = if symbol.is_empty() {
            debug!(
                event_name = "relay.quote.skipped",
                correlation_id = %ctx.correlation_id,
                "message text is empty; replying with help text"
            );
            None
        } else {
            self.quotes.latest_price(&symbol).await
        };

        let reply = Reply::for_lookup(&symbol, price);
        info!(
            event_name = "relay.quote.resolved",
            correlation_id = %ctx.correlation_id,
            symbol = %symbol,
            reply_kind = reply.kind(),
            "quote lookup finished"
        );

        let delivery = self.sender.send_text(&message.sender, &reply.text()).await;
        match &delivery {
            Ok(receipt) => info!(
                event_name = "relay.reply.sent",
                correlation_id = %ctx.correlation_id,
                status = receipt.status,
                message_id = receipt.message_id.as_deref().unwrap_or("unknown"),
                "reply delivered to messaging platform"
            ),
            Err(error) => warn!(
                event_name = "relay.reply.failed",
                correlation_id = %ctx.correlation_id,
                status = error.status(),
                error = %error,
                "reply delivery failed; webhook still acknowledged"
            ),
        }

        RelayOutcome::Replied { symbol, reply, delivery }
    }
}
