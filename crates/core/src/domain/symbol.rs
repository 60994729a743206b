use std::fmt;

/// Instrument symbol derived from a chat message.
///
/// There is no catalog check; the quote provider decides whether a symbol exists.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Symbol(String);

impl Symbol {
    /// Trims surrounding whitespace and upper-cases the remainder.
    pub fn from_message_text(text: &str) -> Self {
        Self(text.trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
