use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

/// Input could not be turned into text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    #[error("PDF could not be read: {0}")]
    Pdf(String),

    #[error("image could not be decoded: {0}")]
    Image(String),

    #[error("OCR failed: {0}")]
    Ocr(String),

    #[error("audio transcription failed: {0}")]
    Transcription(String),

    #[error("no text could be recovered from the {0}")]
    NoText(&'static str),

    #[error("I/O error while preparing input: {0}")]
    Io(String),
}

impl From<std::io::Error> for ExtractionError {
    fn from(err: std::io::Error) -> Self {
        ExtractionError::Io(err.to_string())
    }
}

/// Text-generation provider failure (auth, network, quota, malformed reply).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("generation request failed: {0}")]
    Request(String),

    #[error("generation provider answered {status}: {body}")]
    Status { status: u16, body: String },

    #[error("generation provider returned an unusable response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        BackendError::Request(err.to_string())
    }
}

impl From<async_openai::error::OpenAIError> for BackendError {
    fn from(err: async_openai::error::OpenAIError) -> Self {
        BackendError::Request(err.to_string())
    }
}

/// Email or chat delivery failure. Never invalidates the generated result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    #[error("email delivery is not configured")]
    NotConfigured,

    #[error("email provider rejected the message with status {status}")]
    Rejected { status: u16 },

    #[error("email provider could not be reached: {0}")]
    Transport(String),
}

#[derive(Debug, Clone, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Could not read the input: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Could not generate a response: {0}")]
    Backend(#[from] BackendError),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl AppError {
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::ConfigError(_) => "CONFIG_ERROR",
            AppError::Extraction(_) => "EXTRACTION_ERROR",
            AppError::Backend(_) => "BACKEND_ERROR",
            AppError::InternalError(_) => "INTERNAL_ERROR",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
    pub status: u16,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Extraction(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Backend(_) => StatusCode::BAD_GATEWAY,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.to_string(),
            code: self.error_code(),
            status: self.status_code().as_u16(),
        })
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
