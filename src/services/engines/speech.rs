use std::path::Path;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use super::SpeechToText;
use crate::errors::ExtractionError;

#[derive(Debug, Deserialize)]
struct InferenceResponse {
    text: Option<String>,
    error: Option<String>,
}

/// Speech-to-text against a long-running whisper.cpp server.
///
/// The server loads the model once when it starts; this handle is built once
/// at startup and every request reuses it, so no request pays for loading
/// weights.
pub struct WhisperTranscriber {
    http: reqwest::Client,
    endpoint: String,
}

impl WhisperTranscriber {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, ExtractionError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ExtractionError::Transcription(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Any HTTP answer means the server is up with its model loaded.
    pub async fn is_reachable(&self) -> bool {
        self.http.get(&self.endpoint).send().await.is_ok()
    }
}

#[async_trait]
impl SpeechToText for WhisperTranscriber {
    async fn transcribe(&self, audio_path: &Path) -> Result<String, ExtractionError> {
        let bytes = tokio::fs::read(audio_path).await?;
        let file_name = audio_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "clip.wav".to_string());

        let form = Form::new()
            .part("file", Part::bytes(bytes).file_name(file_name))
            .text("response_format", "json")
            .text("temperature", "0.0");

        let response = self
            .http
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ExtractionError::Transcription(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExtractionError::Transcription(format!(
                "whisper server answered {}: {}",
                status, body
            )));
        }

        let parsed = response
            .json::<InferenceResponse>()
            .await
            .map_err(|e| ExtractionError::Transcription(e.to_string()))?;

        if let Some(error) = parsed.error {
            return Err(ExtractionError::Transcription(error));
        }
        let transcript = parsed.text.unwrap_or_default();

        log::info!("Whisper transcribed {} characters", transcript.len());
        Ok(transcript)
    }
}
