use crate::domain::{quote::Price, symbol::Symbol};

pub const HELP_TEXT: &str = "Sorry, I couldn't find a price for that symbol. \
Try symbols like EUR/USD, GBP/USD, USD/JPY, BTC/USD or AAPL.";

#[derive(Clone, Debug, PartialEq)]
pub enum Reply {
    LatestPrice { symbol: Symbol, price: Price },
    Help,
}

impl Reply {
    pub fn for_lookup(symbol: &Symbol, price: Option<Price>) -> Self {
        match price {
            Some(price) => Self::LatestPrice { symbol: symbol.clone(), price },
            None => Self::Help,
        }
    }

    pub fn text(&self) -> String {
        match self {
            Self::LatestPrice { symbol, price } => format!("Latest price for {symbol}: {price}"),
            Self::Help => HELP_TEXT.to_string(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::LatestPrice { .. } => "latest_price",
            Self::Help => "help",
        }
    }
}
