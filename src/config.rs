use std::{env, fmt::Display, str::FromStr};

use secrecy::{ExposeSecret, SecretString};

use crate::{
    errors::{AppError, AppResult},
    models::domain::GenerationOptions,
};

pub const DEFAULT_LOCAL_MODEL_URL: &str =
    "https://api-inference.huggingface.co/models/EleutherAI/gpt-neo-125M";

/// whisper.cpp server started with the `base` model.
pub const DEFAULT_WHISPER_URL: &str = "http://127.0.0.1:8080/inference";

/// Which text-generation provider serves requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendKind {
    Hosted,
    Local,
}

impl FromStr for BackendKind {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "hosted" | "openai" => Ok(BackendKind::Hosted),
            "local" | "huggingface" => Ok(BackendKind::Local),
            other => Err(AppError::ConfigError(format!(
                "GENERATION_BACKEND must be 'hosted' or 'local', got '{}'",
                other
            ))),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub web_server_host: String,
    pub web_server_port: u16,
    pub backend: BackendKind,
    pub openai_api_key: Option<SecretString>,
    pub openai_api_base: String,
    pub openai_model: String,
    pub openai_max_tokens: u32,
    pub local_model_url: String,
    pub local_model_token: Option<SecretString>,
    pub generation: GenerationOptions,
    pub sendgrid_api_key: Option<SecretString>,
    pub sendgrid_api_base: String,
    pub email_sender: String,
    pub tesseract_bin: String,
    pub ocr_languages: String,
    pub whisper_url: String,
    pub max_upload_bytes: usize,
}

/// Variable lookup with blank values treated as unset.
struct Vars<F> {
    lookup: F,
}

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|value| !value.trim().is_empty())
    }

    fn string(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    fn secret(&self, key: &str) -> Option<SecretString> {
        self.get(key).map(SecretString::from)
    }

    fn parsed<T>(&self, key: &str, default: T) -> AppResult<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.get(key) {
            Some(raw) => raw.trim().parse().map_err(|err| {
                AppError::ConfigError(format!("{} has an invalid value '{}': {}", key, raw, err))
            }),
            None => Ok(default),
        }
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

impl Config {
    /// Reads the process environment. Malformed values are configuration
    /// errors; call [`Config::validate`] before serving.
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup. Missing or blank keys
    /// take their defaults.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars { lookup };
        let defaults = GenerationOptions::default();

        let port_key = if vars.get("WEB_SERVER_PORT").is_some() {
            "WEB_SERVER_PORT"
        } else {
            "PORT"
        };

        Ok(Self {
            web_server_host: vars.string("WEB_SERVER_HOST", "0.0.0.0"),
            web_server_port: vars.parsed(port_key, 10000)?,
            backend: vars.parsed("GENERATION_BACKEND", BackendKind::Local)?,
            openai_api_key: vars.secret("OPENAI_API_KEY"),
            openai_api_base: vars.string("OPENAI_API_BASE", "https://api.openai.com/v1"),
            openai_model: vars.string("OPENAI_MODEL", "gpt-4o-mini"),
            openai_max_tokens: vars.parsed("OPENAI_MAX_TOKENS", 800)?,
            local_model_url: vars.string("LOCAL_MODEL_URL", DEFAULT_LOCAL_MODEL_URL),
            local_model_token: vars.secret("LOCAL_MODEL_TOKEN"),
            generation: GenerationOptions {
                max_new_tokens: vars.parsed("LOCAL_MAX_NEW_TOKENS", defaults.max_new_tokens)?,
                temperature: vars.parsed("LOCAL_TEMPERATURE", defaults.temperature)?,
                top_p: vars.parsed("LOCAL_TOP_P", defaults.top_p)?,
                repetition_penalty: vars
                    .parsed("LOCAL_REPETITION_PENALTY", defaults.repetition_penalty)?,
            },
            sendgrid_api_key: vars.secret("SENDGRID_API_KEY"),
            sendgrid_api_base: vars.string("SENDGRID_API_BASE", "https://api.sendgrid.com"),
            email_sender: vars.string("EMAIL_SENDER", "smartclass@example.com"),
            tesseract_bin: vars.string("TESSERACT_BIN", "tesseract"),
            ocr_languages: vars.string("OCR_LANGUAGES", "spa+eng"),
            whisper_url: vars.string("WHISPER_URL", DEFAULT_WHISPER_URL),
            max_upload_bytes: vars.parsed("MAX_UPLOAD_BYTES", 25 * 1024 * 1024)?,
        })
    }

    /// Fails fast on configuration that would otherwise surface deep inside a request.
    pub fn validate(&self) -> AppResult<()> {
        match self.backend {
            BackendKind::Hosted => {
                let has_key = self
                    .openai_api_key
                    .as_ref()
                    .is_some_and(|key| !key.expose_secret().is_empty());
                if !has_key {
                    return Err(AppError::ConfigError(
                        "OPENAI_API_KEY must be set when GENERATION_BACKEND=hosted".to_string(),
                    ));
                }
                if self.openai_max_tokens == 0 {
                    return Err(AppError::ConfigError(
                        "OPENAI_MAX_TOKENS must be greater than zero".to_string(),
                    ));
                }
            }
            BackendKind::Local => {
                if !is_http_url(&self.local_model_url) {
                    return Err(AppError::ConfigError(format!(
                        "LOCAL_MODEL_URL must be an http(s) URL, got '{}'",
                        self.local_model_url
                    )));
                }
            }
        }

        if !is_http_url(&self.whisper_url) {
            return Err(AppError::ConfigError(format!(
                "WHISPER_URL must be an http(s) URL, got '{}'",
                self.whisper_url
            )));
        }

        let options = &self.generation;
        if options.max_new_tokens == 0 {
            return Err(AppError::ConfigError(
                "LOCAL_MAX_NEW_TOKENS must be greater than zero".to_string(),
            ));
        }
        if options.temperature <= 0.0 {
            return Err(AppError::ConfigError(
                "LOCAL_TEMPERATURE must be positive".to_string(),
            ));
        }
        if !(options.top_p > 0.0 && options.top_p <= 1.0) {
            return Err(AppError::ConfigError(
                "LOCAL_TOP_P must be in (0, 1]".to_string(),
            ));
        }
        if options.repetition_penalty <= 0.0 {
            return Err(AppError::ConfigError(
                "LOCAL_REPETITION_PENALTY must be positive".to_string(),
            ));
        }

        if self.sendgrid_api_key.is_none() {
            log::warn!("SENDGRID_API_KEY is not set; email delivery will be reported as failed");
        }

        Ok(())
    }

    #[cfg(test)]
    pub fn test_config() -> Self {
        Self {
            web_server_host: "127.0.0.1".to_string(),
            web_server_port: 10000,
            backend: BackendKind::Local,
            openai_api_key: None,
            openai_api_base: "http://127.0.0.1:9/v1".to_string(),
            openai_model: "gpt-4o-mini".to_string(),
            openai_max_tokens: 800,
            local_model_url: "http://127.0.0.1:9/generate".to_string(),
            local_model_token: None,
            generation: GenerationOptions::default(),
            sendgrid_api_key: Some(SecretString::from("test_sendgrid_key".to_string())),
            sendgrid_api_base: "http://127.0.0.1:9".to_string(),
            email_sender: "smartclass@example.com".to_string(),
            tesseract_bin: "tesseract".to_string(),
            ocr_languages: "eng".to_string(),
            whisper_url: "http://127.0.0.1:9/inference".to_string(),
            max_upload_bytes: 1024 * 1024,
        }
    }
}
