//! Text-generation backends.
//!
//! [`TextGenerator`] is the one seam the pipeline talks to. The hosted chat
//! backend speaks the OpenAI chat completion protocol; the local model
//! backend speaks the Hugging Face text-generation protocol (a local
//! text-generation-inference server, or the public inference endpoint
//! for small placeholder models).

use std::time::Duration;

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::{
    constants::prompts::STUDENT_ASSISTANT_SYSTEM_PROMPT,
    errors::BackendError,
    models::domain::{GenerationOptions, GenerationResult, Prompt},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(
        &self,
        prompt: &Prompt,
        options: &GenerationOptions,
    ) -> Result<GenerationResult, BackendError>;

    /// Short label for logs and health output.
    fn name(&self) -> &'static str;
}

/// Removes `prompt` from the start of `output` when the model echoed it.
///
/// Only an exact literal prefix is removed, and the continuation is kept
/// as-is. Output that does not begin with the prompt, even if it contains
/// it, is returned unchanged.
pub fn strip_echoed_prompt(prompt: &str, output: &str) -> String {
    match output.strip_prefix(prompt) {
        Some(rest) => rest.to_string(),
        None => output.to_string(),
    }
}

/// Hosted chat completion API. The prompt travels as the user message.
pub struct HostedChatBackend {
    client: Client<OpenAIConfig>,
    model: String,
    max_tokens: u32,
}

impl HostedChatBackend {
    pub fn new(
        api_key: &SecretString,
        api_base: &str,
        model: impl Into<String>,
        max_tokens: u32,
    ) -> Self {
        let config = OpenAIConfig::new()
            .with_api_key(api_key.expose_secret())
            .with_api_base(api_base);

        // A zero elapsed-time budget turns off the client's retry loop, so a
        // 429 or 5xx is reported after the first attempt.
        let no_retry = backoff::ExponentialBackoffBuilder::new()
            .with_max_elapsed_time(Some(Duration::ZERO))
            .build();

        Self {
            client: Client::with_config(config).with_backoff(no_retry),
            model: model.into(),
            max_tokens,
        }
    }
}

#[async_trait]
impl TextGenerator for HostedChatBackend {
    async fn generate(
        &self,
        prompt: &Prompt,
        options: &GenerationOptions,
    ) -> Result<GenerationResult, BackendError> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(STUDENT_ASSISTANT_SYSTEM_PROMPT)
                .build()?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt.as_str())
                .build()?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(self.model.clone())
            .messages(messages)
            .max_completion_tokens(self.max_tokens)
            .temperature(options.temperature)
            .top_p(options.top_p)
            .build()?;

        log::info!("Requesting chat completion from model {}", self.model);
        let response = self.client.chat().create(request).await?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| BackendError::InvalidResponse("no completion choices".to_string()))?;

        Ok(GenerationResult::new(content.trim()))
    }

    fn name(&self) -> &'static str {
        "hosted-chat"
    }
}

#[derive(Debug, Serialize)]
struct TextGenerationRequest<'a> {
    inputs: &'a str,
    parameters: TextGenerationParameters,
}

#[derive(Debug, Serialize)]
struct TextGenerationParameters {
    max_new_tokens: u32,
    temperature: f32,
    top_p: f32,
    repetition_penalty: f32,
    do_sample: bool,
    return_full_text: bool,
}

#[derive(Debug, Deserialize)]
struct GeneratedText {
    generated_text: String,
}

/// The inference API answers with a list, a bare server with one object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TextGenerationResponse {
    Batch(Vec<GeneratedText>),
    Single(GeneratedText),
}

impl TextGenerationResponse {
    fn into_text(self) -> Option<String> {
        match self {
            TextGenerationResponse::Batch(items) => {
                items.into_iter().next().map(|item| item.generated_text)
            }
            TextGenerationResponse::Single(item) => Some(item.generated_text),
        }
    }
}

/// Causal language model served over the text-generation protocol.
///
/// Generation echoes the input, so the prompt prefix is stripped from the
/// output. Calls are serialized: the model instance is not assumed to be
/// safe for concurrent use.
pub struct LocalModelBackend {
    http: reqwest::Client,
    endpoint: String,
    token: Option<SecretString>,
    gate: Mutex<()>,
}

impl LocalModelBackend {
    pub fn new(endpoint: impl Into<String>, token: Option<SecretString>) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder().build()?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
            token,
            gate: Mutex::new(()),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Sends a one-token request so the model is loaded before the first
    /// student request arrives.
    pub async fn warm_up(&self) -> Result<(), BackendError> {
        let options = GenerationOptions {
            max_new_tokens: 1,
            ..GenerationOptions::default()
        };
        self.generate(&Prompt::new("Hello"), &options).await?;
        log::info!("Local model at {} is ready", self.endpoint);
        Ok(())
    }
}

#[async_trait]
impl TextGenerator for LocalModelBackend {
    async fn generate(
        &self,
        prompt: &Prompt,
        options: &GenerationOptions,
    ) -> Result<GenerationResult, BackendError> {
        let body = TextGenerationRequest {
            inputs: prompt.as_str(),
            parameters: TextGenerationParameters {
                max_new_tokens: options.max_new_tokens,
                temperature: options.temperature,
                top_p: options.top_p,
                repetition_penalty: options.repetition_penalty,
                do_sample: true,
                return_full_text: true,
            },
        };

        let mut request = self.http.post(&self.endpoint).json(&body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token.expose_secret());
        }

        let _guard = self.gate.lock().await;
        log::info!(
            "Requesting up to {} new tokens from local model",
            options.max_new_tokens
        );
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::warn!("Local model answered {}: {}", status, body);
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let generated = response
            .json::<TextGenerationResponse>()
            .await
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))?
            .into_text()
            .ok_or_else(|| BackendError::InvalidResponse("no generated text".to_string()))?;

        Ok(GenerationResult::new(strip_echoed_prompt(
            prompt.as_str(),
            &generated,
        )))
    }

    fn name(&self) -> &'static str {
        "local-model"
    }
}
