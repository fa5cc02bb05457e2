//! Inbound chat-platform update wire types.
//!
//! Only the fields the relay reads are modelled; everything else in the
//! platform's update JSON is ignored by serde.

use crate::model::{OperatorMessage, PhotoRef, ReplyControl};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    pub text: Option<String>,
    pub caption: Option<String>,
    /// Available sizes of an attached photo, smallest first.
    #[serde(default)]
    pub photo: Vec<PhotoSize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PhotoSize {
    pub file_id: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub data: Option<String>,
    pub message: Option<Message>,
}

/// What an update means to the relay.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    /// The operator pressed the reply control under an announcement.
    ControlActivation {
        callback_id: String,
        chat_id: Option<i64>,
        message_id: Option<i64>,
        control: ReplyControl,
    },
    /// The operator wrote text and/or sent a photo.
    OperatorMessage {
        chat_id: i64,
        message: OperatorMessage,
    },
}

impl InboundEvent {
    /// Chat the event originated from, when the platform reported one.
    pub fn chat_id(&self) -> Option<i64> {
        match self {
            InboundEvent::ControlActivation { chat_id, .. } => *chat_id,
            InboundEvent::OperatorMessage { chat_id, .. } => Some(*chat_id),
        }
    }
}

impl Update {
    /// Classifies the update; `None` for anything the relay does not act on.
    pub fn into_event(self) -> Option<InboundEvent> {
        if let Some(query) = self.callback_query {
            let control = ReplyControl::parse(query.data.as_deref()?)?;
            return Some(InboundEvent::ControlActivation {
                callback_id: query.id,
                chat_id: query.message.as_ref().map(|m| m.chat.id),
                message_id: query.message.as_ref().map(|m| m.message_id),
                control,
            });
        }

        let message = self.message?;
        let photo = message.photo.last().map(|p| PhotoRef::new(p.file_id.clone()));
        let text = message.caption.or(message.text);
        Some(InboundEvent::OperatorMessage {
            chat_id: message.chat.id,
            message: OperatorMessage::new(text, photo)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OrderId;

    fn parse(json: &str) -> Option<InboundEvent> {
        serde_json::from_str::<Update>(json).unwrap().into_event()
    }

    #[test]
    fn callback_becomes_activation() {
        let event = parse(
            r#"{"update_id": 1, "callback_query": {
                "id": "cb-1", "data": "send_1001",
                "message": {"message_id": 77, "chat": {"id": -100}, "text": "New order #1001"}
            }}"#,
        );
        assert_eq!(
            event,
            Some(InboundEvent::ControlActivation {
                callback_id: "cb-1".to_string(),
                chat_id: Some(-100),
                message_id: Some(77),
                control: ReplyControl::new(OrderId::from("1001")),
            })
        );
    }

    #[test]
    fn photo_message_uses_largest_size_and_caption() {
        let event = parse(
            r#"{"update_id": 2, "message": {
                "message_id": 5, "chat": {"id": -100}, "caption": "Packed",
                "photo": [
                    {"file_id": "small", "width": 90, "height": 90},
                    {"file_id": "large", "width": 1280, "height": 1280}
                ]
            }}"#,
        )
        .unwrap();

        let InboundEvent::OperatorMessage { chat_id, message } = event else {
            panic!("Expected operator message");
        };
        assert_eq!(chat_id, -100);
        assert_eq!(message.text(), Some("Packed"));
        assert_eq!(message.photo(), Some(&PhotoRef::new("large")));
    }

    #[test]
    fn unrelated_updates_are_ignored() {
        // Sticker-only message: no text, caption or photo.
        let sticker = r#"{"update_id": 3, "message": {"message_id": 1, "chat": {"id": 1}}}"#;
        assert!(parse(sticker).is_none());
        // Button that does not belong to the relay.
        let foreign_button = r#"{"update_id": 4, "callback_query": {"id": "x", "data": "other"}}"#;
        assert!(parse(foreign_button).is_none());
        // Update kinds we do not subscribe to.
        assert!(parse(r#"{"update_id": 5, "edited_message": {}}"#).is_none());
    }
}
