//! Operator-authored content waiting to be attributed to an order.

/// Handle to a photo stored on the chat platform.
///
/// Only the platform's file handle travels through the system; the relay turns
/// it into a retrievable URL and never downloads the binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoRef {
    pub file_id: String,
}

impl PhotoRef {
    pub fn new(file_id: impl Into<String>) -> Self {
        Self {
            file_id: file_id.into(),
        }
    }
}

/// A text and/or photo message sent by the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorMessage {
    text: Option<String>,
    photo: Option<PhotoRef>,
}

impl OperatorMessage {
    /// Builds a message, treating whitespace-only text as absent.
    ///
    /// Returns `None` when neither text nor photo remains, since such a message
    /// carries nothing worth relaying.
    pub fn new(text: Option<String>, photo: Option<PhotoRef>) -> Option<Self> {
        let text = text
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        if text.is_none() && photo.is_none() {
            return None;
        }
        Some(Self { text, photo })
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn photo(&self) -> Option<&PhotoRef> {
        self.photo.as_ref()
    }
}
