//! Wire protocol for the chat room
//!
//! One full-duplex WebSocket per client; every frame is a JSON object
//! tagged by `type`, camelCase throughout.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::lang::Language;
use crate::registry::{ConnectionId, Session};

/// Incoming client event
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientEvent {
    /// Enter the room
    #[serde(rename_all = "camelCase")]
    Join {
        display_name: String,
        #[serde(default)]
        elevated: bool,
    },

    /// Transient typing indicator; not persisted, not acknowledged
    #[serde(rename_all = "camelCase")]
    Typing { is_typing: bool },

    /// Text chat message
    #[serde(rename_all = "camelCase")]
    ChatMessage {
        text: String,
        #[serde(default)]
        credential: Option<String>,
    },

    /// Voice message, optionally already processed by the sending client
    #[serde(rename_all = "camelCase")]
    VoiceMessage {
        audio_base64: String,
        #[serde(default)]
        credential: Option<String>,
        #[serde(default)]
        transcription: Option<String>,
        #[serde(default)]
        translation: Option<String>,
        #[serde(default)]
        source_language: Option<Language>,
        #[serde(default)]
        target_language: Option<Language>,
        #[serde(default)]
        processed_locally: bool,
    },

    /// Explicitly replace the shared translation credential
    #[serde(rename_all = "camelCase")]
    SetCredential { credential: String },
}

/// Outgoing server event
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerEvent {
    /// A user joined; sent to everyone including the joiner
    #[serde(rename_all = "camelCase")]
    UserJoined { user: Session, users: Vec<Session> },

    /// Full presence snapshot, sent directly to a new joiner
    #[serde(rename_all = "camelCase")]
    UsersList { users: Vec<Session> },

    #[serde(rename_all = "camelCase")]
    UserLeft {
        connection_id: ConnectionId,
        display_name: String,
    },

    #[serde(rename_all = "camelCase")]
    UserTyping {
        connection_id: ConnectionId,
        display_name: String,
        is_typing: bool,
    },

    /// Raw chat message, broadcast before any translation
    #[serde(rename_all = "camelCase")]
    Message {
        sender: Session,
        text: String,
        language: Language,
        timestamp: DateTime<Utc>,
    },

    /// Derived translation of an earlier message; the original text is
    /// duplicated, not linked
    #[serde(rename_all = "camelCase")]
    TranslatedMessage {
        sender: Session,
        original_text: String,
        translated_text: String,
        source_language: Language,
        target_language: Language,
        timestamp: DateTime<Utc>,
    },

    /// Raw voice message
    #[serde(rename_all = "camelCase")]
    VoiceMessage {
        sender: Session,
        audio_base64: String,
        timestamp: DateTime<Utc>,
    },

    /// Derived transcription + translation of an earlier voice message
    #[serde(rename_all = "camelCase")]
    VoiceTranscription {
        sender: Session,
        original_timestamp: DateTime<Utc>,
        transcription: String,
        translation: String,
        source_language: Language,
        target_language: Language,
        timestamp: DateTime<Utc>,
    },

    #[serde(rename_all = "camelCase")]
    CredentialAck { success: bool },

    #[serde(rename_all = "camelCase")]
    Error { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_deserializes() {
        let json = r#"{"type":"join","displayName":"Alice","elevated":true}"#;
        let event: ClientEvent = serde_json::from_str(json).unwrap();
        assert!(matches!(
            event,
            ClientEvent::Join { display_name, elevated: true } if display_name == "Alice"
        ));
    }

    #[test]
    fn join_elevated_defaults_to_false() {
        let json = r#"{"type":"join","displayName":"Bob"}"#;
        let event: ClientEvent = serde_json::from_str(json).unwrap();
        assert!(matches!(event, ClientEvent::Join { elevated: false, .. }));
    }

    #[test]
    fn chat_message_credential_is_optional() {
        let json = r#"{"type":"chatMessage","text":"hi"}"#;
        let event: ClientEvent = serde_json::from_str(json).unwrap();
        assert!(matches!(
            event,
            ClientEvent::ChatMessage { credential: None, .. }
        ));
    }

    #[test]
    fn voice_message_deserializes_with_local_processing() {
        let json = r#"{
            "type": "voiceMessage",
            "audioBase64": "AAAA",
            "transcription": "hello",
            "translation": "xin chào",
            "sourceLanguage": "en",
            "targetLanguage": "vi",
            "processedLocally": true
        }"#;
        let event: ClientEvent = serde_json::from_str(json).unwrap();
        let ClientEvent::VoiceMessage {
            source_language,
            processed_locally,
            ..
        } = event
        else {
            panic!("wrong variant");
        };
        assert_eq!(source_language, Some(Language::English));
        assert!(processed_locally);
    }

    #[test]
    fn message_serializes_with_tag_and_camel_case() {
        let event = ServerEvent::Message {
            sender: Session {
                id: ConnectionId::new(),
                display_name: "Alice".to_string(),
                elevated: false,
            },
            text: "hello".to_string(),
            language: Language::English,
            timestamp: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["type"], "message");
        assert_eq!(json["language"], "en");
        assert_eq!(json["sender"]["displayName"], "Alice");
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn user_typing_serializes() {
        let event = ServerEvent::UserTyping {
            connection_id: ConnectionId::new(),
            display_name: "Bob".to_string(),
            is_typing: true,
        };
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["type"], "userTyping");
        assert_eq!(json["isTyping"], true);
        assert!(json["connectionId"].is_string());
    }

    #[test]
    fn credential_ack_serializes() {
        let json = serde_json::to_value(ServerEvent::CredentialAck { success: true }).unwrap();
        assert_eq!(json["type"], "credentialAck");
        assert_eq!(json["success"], true);
    }
}
