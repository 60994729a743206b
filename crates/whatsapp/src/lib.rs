//! WhatsApp Cloud API integration - webhook side and send side
//!
//! This crate provides the WhatsApp interface for pricewire:
//! - **Verification** (`verification`) - the `hub.*` subscribe handshake Meta
//!   performs before it starts delivering events
//! - **Envelope** (`envelope`) - lifts the first text message out of a
//!   `entry[].changes[].value.messages[]` delivery
//! - **Sender** (`sender`) - Graph API `/{phone-number-id}/messages` client
//!
//! # Getting Started
//!
//! 1. Create a Meta app with the WhatsApp product at https://developers.facebook.com/apps
//! 2. Point the webhook callback at `https://<host>/webhook` and pick a verify token
//! 3. Subscribe the app to the `messages` webhook field
//! 4. Set env vars: `PRICEWIRE_WHATSAPP_ACCESS_TOKEN`, `PRICEWIRE_WHATSAPP_PHONE_NUMBER_ID`,
//!    `PRICEWIRE_WHATSAPP_VERIFY_TOKEN`
//!
//! # Architecture
//!
//! ```text
//! Meta webhook → envelope::extract_first_message → MessageRelay → GraphApiSender
//!                                                       ↓
//!                                                 QuoteProvider
//! ```

pub mod envelope;
pub mod sender;
pub mod verification;

pub use envelope::{extract_first_message, EnvelopeError};
pub use sender::GraphApiSender;
pub use verification::{verify_subscription, Verification, VerificationQuery};
