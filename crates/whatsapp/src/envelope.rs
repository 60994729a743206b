use pricewire_core::InboundMessage;
use serde_json::Value;
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum EnvelopeError {
    #[error("webhook body is not valid json: {0}")]
    InvalidJson(String),
    #[error("webhook envelope is missing `{0}`")]
    MissingField(&'static str),
    #[error("webhook envelope field `{0}` has an unexpected type")]
    UnexpectedType(&'static str),
}

/// Reads the first message of the first change of the first entry.
///
/// Returns `Ok(None)` when the delivery is well formed but carries no message
/// (status callbacks, empty arrays). Every other item in the envelope is ignored.
pub fn extract_first_message(body: &[u8]) -> Result<Option<InboundMessage>, EnvelopeError> {
    let root: Value =
        serde_json::from_slice(body).map_err(|error| EnvelopeError::InvalidJson(error.to_string()))?;

    let entries = required_array(&root, "entry", "entry")?;
    let Some(entry) = entries.first() else {
        return Ok(None);
    };

    let changes = required_array(entry, "changes", "entry[0].changes")?;
    let Some(change) = changes.first() else {
        return Ok(None);
    };

    let value = change.get("value").ok_or(EnvelopeError::MissingField("entry[0].changes[0].value"))?;
    if !value.is_object() {
        return Err(EnvelopeError::UnexpectedType("entry[0].changes[0].value"));
    }

    let messages = match value.get("messages") {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Array(messages)) => messages,
        Some(_) => return Err(EnvelopeError::UnexpectedType("entry[0].changes[0].value.messages")),
    };
    let Some(message) = messages.first() else {
        return Ok(None);
    };

    let sender = string_field(message.get("from"));
    let text = string_field(message.get("text").and_then(|text| text.get("body")));
    let mut inbound = InboundMessage::new(sender, text);
    if let Some(id) = message.get("id").and_then(Value::as_str) {
        inbound = inbound.with_message_id(id);
    }

    Ok(Some(inbound))
}

fn required_array<'a>(
    parent: &'a Value,
    key: &str,
    field: &'static str,
) -> Result<&'a Vec<Value>, EnvelopeError> {
    match parent.get(key) {
        None => Err(EnvelopeError::MissingField(field)),
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err(EnvelopeError::UnexpectedType(field)),
    }
}

fn string_field(value: Option<&Value>) -> String {
    value.and_then(Value::as_str).unwrap_or_default().to_owned()
}
