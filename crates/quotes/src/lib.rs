//! Quote provider integration.
//!
//! `TwelveDataClient` calls the Twelve Data `/price` endpoint and implements
//! [`pricewire_core::QuoteProvider`]. The trait surface only ever yields a
//! price or nothing; [`TwelveDataClient::fetch_price`] keeps the typed error
//! for operator tooling.

pub mod twelvedata;

pub use twelvedata::{QuoteProviderError, TwelveDataClient};
