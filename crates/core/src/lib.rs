pub mod config;
pub mod domain;
pub mod errors;
pub mod ports;
pub mod relay;

pub use domain::message::InboundMessage;
pub use domain::quote::Price;
pub use domain::reply::{Reply, HELP_TEXT};
pub use domain::symbol::Symbol;
pub use errors::DeliveryError;
pub use ports::{DeliveryReceipt, MessageSender, QuoteProvider};
pub use relay::{MessageRelay, RelayContext, RelayOutcome};
