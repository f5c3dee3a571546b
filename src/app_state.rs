use std::sync::Arc;

use crate::{
    config::{BackendKind, Config},
    errors::{AppError, AppResult},
    services::{
        dispatch_service::{DispatchService, Mailer, SendGridMailer},
        engines::{TesseractOcr, WhisperTranscriber},
        model_service::{HostedChatBackend, LocalModelBackend, TextGenerator},
        normalizer_service::NormalizerService,
        pipeline_service::PipelineService,
    },
};

/// Everything a request handler needs. The backend and engines inside are
/// built once here and shared by handle across requests.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<PipelineService>,
    pub config: Arc<Config>,
}

impl AppState {
    pub async fn new(config: Config) -> AppResult<Self> {
        config.validate()?;

        let ocr = TesseractOcr::new(&config.tesseract_bin, &config.ocr_languages);
        if !ocr.is_available().await {
            log::warn!(
                "'{}' is not available; image uploads will fail",
                config.tesseract_bin
            );
        }

        let speech = WhisperTranscriber::new(&config.whisper_url)?;
        if !speech.is_reachable().await {
            log::warn!(
                "Whisper server at {} is not reachable; audio uploads will fail",
                speech.endpoint()
            );
        }

        let normalizer = Arc::new(NormalizerService::new(Arc::new(ocr), Arc::new(speech)));
        let generator = build_generator(&config).await?;

        let mailer: Option<Arc<dyn Mailer>> = config.sendgrid_api_key.clone().map(|key| {
            Arc::new(SendGridMailer::new(&config.sendgrid_api_base, key)) as Arc<dyn Mailer>
        });
        let dispatcher = Arc::new(DispatchService::new(mailer, &config.email_sender));

        let pipeline = PipelineService::new(normalizer, generator, dispatcher, config.generation);

        log::info!(
            "Pipeline ready with the {} backend",
            pipeline.generator().name()
        );

        Ok(Self::from_parts(pipeline, config))
    }

    pub fn from_parts(pipeline: PipelineService, config: Config) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            config: Arc::new(config),
        }
    }
}

async fn build_generator(config: &Config) -> AppResult<Arc<dyn TextGenerator>> {
    match config.backend {
        BackendKind::Hosted => {
            let api_key = config.openai_api_key.as_ref().ok_or_else(|| {
                AppError::ConfigError("OPENAI_API_KEY is required for the hosted backend".into())
            })?;
            Ok(Arc::new(HostedChatBackend::new(
                api_key,
                &config.openai_api_base,
                &config.openai_model,
                config.openai_max_tokens,
            )))
        }
        BackendKind::Local => {
            let backend =
                LocalModelBackend::new(&config.local_model_url, config.local_model_token.clone())?;
            if let Err(err) = backend.warm_up().await {
                log::warn!(
                    "Local model at {} did not answer the warm-up request: {}",
                    backend.endpoint(),
                    err
                );
            }
            Ok(Arc::new(backend))
        }
    }
}
