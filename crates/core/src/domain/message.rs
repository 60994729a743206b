/// A plain-text chat message addressed to the bot, already lifted out of the
/// platform envelope.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InboundMessage {
    /// Platform message id, used as the correlation id when present.
    pub message_id: Option<String>,
    /// Identifier replies are addressed to (a WhatsApp id for this platform).
    pub sender: String,
    /// Raw message body; empty when the message carried no text.
    pub text: String,
}

impl InboundMessage {
    pub fn new(sender: impl Into<String>, text: impl Into<String>) -> Self {
        Self { message_id: None, sender: sender.into(), text: text.into() }
    }

    pub fn with_message_id(mut self, message_id: impl Into<String>) -> Self {
        self.message_id = Some(message_id.into());
        self
    }

    pub fn has_sender(&self) -> bool {
        !self.sender.trim().is_empty()
    }
}
