use std::sync::Arc;

use crate::{
    app_state::AppState,
    config::Config,
    models::domain::{GenerationOptions, GenerationResult},
    services::{
        dispatch_service::{DispatchService, Mailer, MockMailer},
        engines::{MockOcrEngine, MockSpeechToText},
        model_service::{strip_echoed_prompt, MockTextGenerator},
        normalizer_service::NormalizerService,
        pipeline_service::PipelineService,
    },
};

#[cfg(test)]
pub mod fixtures {
    use super::*;

    /// Generator that behaves like an echoing local model.
    pub fn echoing_generator(continuation: &'static str) -> MockTextGenerator {
        let mut generator = MockTextGenerator::new();
        generator.expect_generate().returning(move |prompt, _| {
            let raw = format!("{}{}", prompt.as_str(), continuation);
            Ok(GenerationResult::new(strip_echoed_prompt(prompt.as_str(), &raw)))
        });
        generator.expect_name().return_const("mock");
        generator
    }

    /// App state around the given generator with idle OCR and speech engines.
    pub fn test_state(generator: MockTextGenerator, mailer: Option<MockMailer>) -> AppState {
        let normalizer = NormalizerService::new(
            Arc::new(MockOcrEngine::new()),
            Arc::new(MockSpeechToText::new()),
        );
        let mailer = mailer.map(|m| Arc::new(m) as Arc<dyn Mailer>);
        let pipeline = PipelineService::new(
            Arc::new(normalizer),
            Arc::new(generator),
            Arc::new(DispatchService::new(mailer, "smartclass@example.com")),
            GenerationOptions::default(),
        );
        AppState::from_parts(pipeline, Config::test_config())
    }
}

#[cfg(test)]
pub mod test_helpers {
    use actix_web::http::StatusCode;

    /// Asserts that a status code represents an error (4xx or 5xx)
    pub fn assert_error_status(status: StatusCode) {
        assert!(
            status.is_client_error() || status.is_server_error(),
            "Expected error status, got: {}",
            status
        );
    }

    /// Asserts that a status code represents success (2xx)
    pub fn assert_success_status(status: StatusCode) {
        assert!(
            status.is_success(),
            "Expected success status, got: {}",
            status
        );
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;

    #[test]
    fn test_fixture_state_uses_mock_backend() {
        let state = test_state(echoing_generator("ok"), None);
        assert_eq!(state.pipeline.generator().name(), "mock");
    }
}
