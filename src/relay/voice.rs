//! Voice pipeline coordinator
//!
//! Runs after the raw-audio broadcast. Three paths: echo a client-processed
//! result, run the server-side transcribe-then-translate chain, or let the
//! raw audio stand alone.

use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, Utc};

use crate::Error;
use crate::lang::{self, Language};
use crate::registry::{ConnectionId, Session};

use super::Relay;
use super::protocol::ServerEvent;

/// Inbound voice event fields, as received off the wire
pub(crate) struct VoicePayload {
    pub audio_base64: String,
    pub credential: Option<String>,
    pub transcription: Option<String>,
    pub translation: Option<String>,
    pub source_language: Option<Language>,
    pub target_language: Option<Language>,
    pub processed_locally: bool,
}

impl Relay {
    pub(crate) async fn handle_voice(self: &Arc<Self>, id: ConnectionId, payload: VoicePayload) {
        let (sender, timestamp) = {
            let room = self.room.lock().await;
            let Some(sender) = room.session_if_joined(id) else {
                return;
            };

            // Reject garbage payloads before anything is broadcast
            match BASE64.decode(&payload.audio_base64) {
                Ok(bytes) => {
                    tracing::debug!(conn = %id, audio_bytes = bytes.len(), "voice message received");
                }
                Err(e) => {
                    let e = Error::InvalidPayload(e.to_string());
                    tracing::warn!(conn = %id, error = %e, "voice message dropped");
                    room.send_to(
                        id,
                        ServerEvent::Error {
                            message: e.to_string(),
                        },
                    );
                    return;
                }
            }

            if let Some(supplied) = &payload.credential {
                self.credential.put_if_absent(supplied);
            }

            let timestamp = Utc::now();
            room.broadcast_all(&ServerEvent::VoiceMessage {
                sender: sender.clone(),
                audio_base64: payload.audio_base64.clone(),
                timestamp,
            });
            (sender, timestamp)
        };

        // Fast path: the sending client already ran the pipeline
        if payload.processed_locally {
            if let (Some(transcription), Some(translation)) =
                (payload.transcription, payload.translation)
            {
                // Tags the client omitted are recovered from the transcript
                let source = payload
                    .source_language
                    .unwrap_or_else(|| lang::detect(&transcription));
                let target = payload
                    .target_language
                    .unwrap_or_else(|| source.complement());

                tracing::debug!(conn = %id, "using client-processed transcription");
                let room = self.room.lock().await;
                room.broadcast_all(&ServerEvent::VoiceTranscription {
                    sender,
                    original_timestamp: timestamp,
                    transcription,
                    translation,
                    source_language: source,
                    target_language: target,
                    timestamp: Utc::now(),
                });
                return;
            }
        }

        // Server path: transcribe then translate. A key supplied on the
        // event is preferred over the stored one.
        let Some(api_key) = payload.credential.or_else(|| self.credential.get()) else {
            // No credential and not locally processed: raw audio stands alone
            return;
        };

        let relay = Arc::clone(self);
        let audio = payload.audio_base64;
        tokio::spawn(async move {
            relay
                .transcribe_and_broadcast(id, sender, audio, timestamp, api_key)
                .await;
        });
    }

    /// Server-side fallback chain; runs outside the room lock.
    async fn transcribe_and_broadcast(
        &self,
        id: ConnectionId,
        sender: Session,
        audio_base64: String,
        original_timestamp: DateTime<Utc>,
        api_key: String,
    ) {
        match self.transcribe_then_translate(&audio_base64, &api_key).await {
            Ok((transcription, translation, source)) => {
                let room = self.room.lock().await;
                room.broadcast_all(&ServerEvent::VoiceTranscription {
                    sender,
                    original_timestamp,
                    transcription,
                    translation,
                    source_language: source,
                    target_language: source.complement(),
                    timestamp: Utc::now(),
                });
            }
            Err(e) => {
                // Only the sender hears about it; the raw audio already
                // reached everyone
                tracing::warn!(conn = %id, error = %e, "voice pipeline failed");
                let room = self.room.lock().await;
                room.send_to(
                    id,
                    ServerEvent::Error {
                        message: e.to_string(),
                    },
                );
            }
        }
    }

    async fn transcribe_then_translate(
        &self,
        audio_base64: &str,
        api_key: &str,
    ) -> Result<(String, String, Language), Error> {
        let transcription = self
            .gateway
            .transcribe(audio_base64, api_key)
            .await
            .map_err(Error::Transcription)?;

        let source = lang::detect(&transcription);

        let translation = self
            .gateway
            .translate(&transcription, source, api_key)
            .await
            .map_err(Error::Transcription)?;

        Ok((transcription, translation, source))
    }
}
