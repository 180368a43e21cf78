use serde::{Deserialize, Serialize};
use std::fmt;

/// A human-readable hardware status line travelling from a producer to the UI.
///
/// The text is carried as-is: no trimming, no validation. Whatever the
/// producer handed to [`MessageRelay::deliver`](crate::MessageRelay::deliver)
/// is exactly what the presentation sink receives.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HardwareMessage {
    text: String,
}

impl HardwareMessage {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }

    /// True when there is nothing worth showing (empty or whitespace only).
    /// Sinks may use this to skip rendering; the relay itself never does.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

impl fmt::Display for HardwareMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl From<String> for HardwareMessage {
    fn from(text: String) -> Self {
        Self { text }
    }
}

impl From<&str> for HardwareMessage {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<&String> for HardwareMessage {
    fn from(text: &String) -> Self {
        Self::new(text.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_is_preserved_verbatim() {
        let message = HardwareMessage::from("  Device disconnected \n");
        assert_eq!(message.text(), "  Device disconnected \n");
        assert_eq!(message.to_string(), "  Device disconnected \n");
        assert_eq!(message.into_text(), "  Device disconnected \n");
    }

    #[test]
    fn test_blank_detection() {
        assert!(HardwareMessage::new("").is_blank());
        assert!(HardwareMessage::new(" \t").is_blank());
        assert!(!HardwareMessage::new("Battery 42%").is_blank());
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let message = HardwareMessage::new("Scan started");
        let json = serde_json::to_string(&message).unwrap();
        assert_eq!(json, "\"Scan started\"");

        let parsed: HardwareMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, message);
    }
}
