use std::fmt;

/// Latest traded price for a symbol. Always finite.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Price(f64);

impl Price {
    pub fn new(value: f64) -> Option<Self> {
        value.is_finite().then_some(Self(value))
    }

    /// Accepts either a JSON number or a numeric string, which is how most
    /// market data APIs serialize prices.
    pub fn parse(raw: &str) -> Option<Self> {
        raw.trim().parse::<f64>().ok().and_then(Self::new)
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
