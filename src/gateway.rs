//! Translation and transcription gateway client
//!
//! Wraps the external generative-language API behind two operations:
//! text translation and audio transcription. Requests carry role-tagged
//! content parts; the result is the first candidate's text. A single
//! attempt per call, no retries, no backoff; callers decide whether to
//! degrade gracefully.

use serde::{Deserialize, Serialize};

use crate::error::GatewayError;
use crate::lang::Language;

/// Default public endpoint of the generative-language API
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default model identifier
pub const DEFAULT_MODEL: &str = "gemini-2.5-pro-exp-03-25";

/// Priming instruction that pins the model to translation-only output
const TRANSLATION_PRIMER: &str =
    "INSTRUCTION: You are a translation assistant that translates between \
     English and Vietnamese. When given text in English, translate it to \
     Vietnamese. When given text in Vietnamese, translate it to English. \
     Return ONLY the translation without any additional text or explanations.";

/// Scripted model acknowledgement of the primer
const TRANSLATION_ACK: &str =
    "I understand. I will translate between English and Vietnamese, \
     returning only the translation without additional text.";

const TRANSCRIPTION_PROMPT: &str =
    "Transcribe this audio. Return ONLY the transcription, no other text.";

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

impl Part {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    fn audio(data: impl Into<String>) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData {
                mime_type: "audio/wav",
                data: data.into(),
            }),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: &'static str,
    data: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

/// Client for the external translation/transcription engine
#[derive(Debug, Clone)]
pub struct GatewayClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl GatewayClient {
    /// Create a client against the public endpoint.
    #[must_use]
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: model.into(),
        }
    }

    /// Point the client at a different endpoint (tests, self-hosted proxies).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Translate `text` from `source` into its complement language.
    ///
    /// # Errors
    ///
    /// [`GatewayError::Transport`] if the call fails outright;
    /// [`GatewayError::MalformedResponse`] if the payload carries no
    /// candidate text.
    pub async fn translate(
        &self,
        text: &str,
        source: Language,
        api_key: &str,
    ) -> Result<String, GatewayError> {
        let target = source.complement();
        let prompt = format!(
            "Translate this {} text to {}. Return ONLY the translation, no other text: \"{text}\"",
            source.name(),
            target.name(),
        );

        let request = GenerateRequest {
            contents: vec![
                Content {
                    role: "user",
                    parts: vec![Part::text(TRANSLATION_PRIMER)],
                },
                Content {
                    role: "model",
                    parts: vec![Part::text(TRANSLATION_ACK)],
                },
                Content {
                    role: "user",
                    parts: vec![Part::text(prompt)],
                },
            ],
        };

        tracing::debug!(
            source = source.code(),
            target = target.code(),
            chars = text.len(),
            "requesting translation"
        );

        let translated = self.generate(&request, api_key).await?;
        tracing::info!(target = target.code(), "translation complete");
        Ok(translated)
    }

    /// Transcribe a base64-encoded WAV payload.
    ///
    /// # Errors
    ///
    /// Same failure taxonomy as [`Self::translate`].
    pub async fn transcribe(
        &self,
        audio_base64: &str,
        api_key: &str,
    ) -> Result<String, GatewayError> {
        let request = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part::text(TRANSCRIPTION_PROMPT), Part::audio(audio_base64)],
            }],
        };

        tracing::debug!(audio_chars = audio_base64.len(), "requesting transcription");

        let transcript = self.generate(&request, api_key).await?;
        tracing::info!("transcription complete");
        Ok(transcript)
    }

    /// Single-attempt `generateContent` call; extracts the first candidate's
    /// text.
    async fn generate(
        &self,
        request: &GenerateRequest,
        api_key: &str,
    ) -> Result<String, GatewayError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={api_key}",
            self.base_url, self.model,
        );

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "gateway call failed");
            return Err(GatewayError::Transport(format!(
                "gateway returned {status}: {body}"
            )));
        }

        let payload: GenerateResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::MalformedResponse(e.to_string()))?;

        payload
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .ok_or_else(|| {
                GatewayError::MalformedResponse("no candidate text in response".to_string())
            })
    }
}
