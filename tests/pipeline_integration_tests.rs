use std::{
    path::Path,
    sync::{Arc, Mutex},
};

use actix_web::{http::StatusCode, test, web, App};
use async_trait::async_trait;
use serde_json::{json, Value};

use smartclass_helper::{
    app_state::AppState,
    config::Config,
    errors::{BackendError, DeliveryError, ExtractionError},
    handlers::{chat_webhook, health_check, run_file_task, run_text_task},
    middleware::{RequestIdMiddleware, REQUEST_ID_HEADER},
    models::domain::{
        DeliveryTarget, DispatchOutcome, GenerationOptions, GenerationResult, InputSource,
        Prompt, TaskKind,
    },
    services::{
        dispatch_service::{DispatchService, EmailMessage, Mailer},
        engines::{OcrEngine, SpeechToText},
        model_service::{strip_echoed_prompt, TextGenerator},
        normalizer_service::NormalizerService,
        pipeline_service::{PipelineRequest, PipelineService},
    },
};

/// Echoes the prompt like a local causal model, then appends a fixed answer.
struct EchoingModel {
    answer: String,
    prompts: Mutex<Vec<String>>,
}

impl EchoingModel {
    fn new(answer: &str) -> Self {
        Self {
            answer: answer.to_string(),
            prompts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl TextGenerator for EchoingModel {
    async fn generate(
        &self,
        prompt: &Prompt,
        _options: &GenerationOptions,
    ) -> Result<GenerationResult, BackendError> {
        self.prompts.lock().unwrap().push(prompt.as_str().to_string());
        let raw = format!("{}{}", prompt.as_str(), self.answer);
        Ok(GenerationResult::new(strip_echoed_prompt(prompt.as_str(), &raw)))
    }

    fn name(&self) -> &'static str {
        "echoing-model"
    }
}

struct FixedOcr(&'static str);

#[async_trait]
impl OcrEngine for FixedOcr {
    async fn recognize(&self, image_path: &Path) -> Result<String, ExtractionError> {
        assert!(image_path.exists());
        Ok(self.0.to_string())
    }
}

struct FixedTranscript(&'static str);

#[async_trait]
impl SpeechToText for FixedTranscript {
    async fn transcribe(&self, audio_path: &Path) -> Result<String, ExtractionError> {
        assert!(audio_path.exists());
        Ok(self.0.to_string())
    }
}

/// Records messages and answers with a fixed provider status.
struct RecordingMailer {
    status: u16,
    sent: Mutex<Vec<EmailMessage>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: &EmailMessage) -> Result<u16, DeliveryError> {
        self.sent.lock().unwrap().push(message.clone());
        Ok(self.status)
    }
}

struct Harness {
    model: Arc<EchoingModel>,
    mailer: Arc<RecordingMailer>,
    pipeline: PipelineService,
}

fn harness(answer: &str, mail_status: u16) -> Harness {
    let model = Arc::new(EchoingModel::new(answer));
    let mailer = Arc::new(RecordingMailer {
        status: mail_status,
        sent: Mutex::new(Vec::new()),
    });
    let normalizer = NormalizerService::new(
        Arc::new(FixedOcr("Mitochondria produce energy")),
        Arc::new(FixedTranscript("Today we review the French revolution")),
    );
    let pipeline = PipelineService::new(
        Arc::new(normalizer),
        model.clone(),
        Arc::new(DispatchService::new(
            Some(mailer.clone() as Arc<dyn Mailer>),
            "smartclass@example.com",
        )),
        GenerationOptions::default(),
    );
    Harness {
        model,
        mailer,
        pipeline,
    }
}

fn png_bytes() -> Vec<u8> {
    let image = image::RgbImage::from_pixel(8, 8, image::Rgb([0, 0, 0]));
    let mut bytes = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(image)
        .write_to(&mut bytes, image::ImageFormat::Png)
        .unwrap();
    bytes.into_inner()
}

#[actix_web::test]
async fn test_each_task_gets_its_own_template() {
    let h = harness("done", 202);

    for task in TaskKind::ALL {
        let output = h
            .pipeline
            .run(PipelineRequest {
                task,
                source: InputSource::RawText("photosynthesis".into()),
                target: DeliveryTarget::None,
            })
            .await
            .unwrap();
        assert_eq!(output.result.as_str(), "done");
    }

    let prompts = h.model.prompts.lock().unwrap();
    assert_eq!(prompts.len(), TaskKind::ALL.len());
    for (prompt, task) in prompts.iter().zip(TaskKind::ALL) {
        assert!(prompt.ends_with("photosynthesis"));
        assert!(prompt.starts_with(task.template().trim_end_matches("{text}")));
    }
}

#[actix_web::test]
async fn test_audio_summary_is_emailed_with_audio_subject() {
    let h = harness("The revolution began in 1789.", 202);

    let output = h
        .pipeline
        .run(PipelineRequest {
            task: TaskKind::Summarize,
            source: InputSource::AudioClip(b"RIFF....WAVE".to_vec()),
            target: DeliveryTarget::EmailAddress("ana@school.org".into()),
        })
        .await
        .unwrap();

    assert_eq!(output.result.as_str(), "The revolution began in 1789.");
    assert_eq!(
        output.outcome,
        DispatchOutcome::Emailed {
            recipient: "ana@school.org".into(),
            status: 202
        }
    );

    let sent = h.mailer.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, "SmartClass Audio Summary");
    assert_eq!(sent[0].body, "The revolution began in 1789.");
    assert!(h.model.prompts.lock().unwrap()[0].contains("French revolution"));
}

#[actix_web::test]
async fn test_image_explanation_uses_ocr_text() {
    let h = harness("Step 1: ...", 202);

    let output = h
        .pipeline
        .run(PipelineRequest {
            task: TaskKind::ExplainExercise,
            source: InputSource::Image(png_bytes()),
            target: DeliveryTarget::None,
        })
        .await
        .unwrap();

    assert_eq!(output.result.as_str(), "Step 1: ...");
    assert!(h.model.prompts.lock().unwrap()[0].ends_with("Mitochondria produce energy"));
}

#[actix_web::test]
async fn test_rejected_email_leaves_result_untouched() {
    let h = harness("1. Essay\n2. Math", 503);

    let output = h
        .pipeline
        .run(PipelineRequest {
            task: TaskKind::OrganizeTasks,
            source: InputSource::RawText("math, essay".into()),
            target: DeliveryTarget::EmailAddress("ana@school.org".into()),
        })
        .await
        .unwrap();

    assert_eq!(output.result.as_str(), "1. Essay\n2. Math");
    assert!(matches!(
        output.outcome,
        DispatchOutcome::DeliveryFailed {
            error: DeliveryError::Rejected { status: 503 },
            ..
        }
    ));
}

#[actix_web::test]
async fn test_http_surface_end_to_end() {
    let h = harness("Cats rest on mats.", 202);
    let state = AppState::from_parts(h.pipeline, Config::from_lookup(|_| None).unwrap());

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .wrap(RequestIdMiddleware)
            .service(health_check)
            .service(chat_webhook)
            .service(run_text_task)
            .service(run_file_task),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/tasks/summarize")
        .set_json(json!({ "text": "The cat sat on the mat.", "email": "" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key(REQUEST_ID_HEADER));
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["result"], "Cats rest on mats.");
    assert_eq!(body["delivery"]["status"], "not_requested");

    let req = test::TestRequest::post()
        .uri("/api/tasks/summarize/audio?email=ana@school.org")
        .set_payload(b"ID3 fake mp3".to_vec())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["input"], "audio");
    assert_eq!(body["delivery"]["status"], "sent");

    let req = test::TestRequest::post()
        .uri("/whatsapp")
        .set_form([("Body", "essay monday")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    let body = String::from_utf8(body.to_vec()).unwrap();
    assert!(body.contains("<Message>📅 *Organized tasks*\n\nCats rest on mats.</Message>"));

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["backend"], "echoing-model");

    assert_eq!(h.mailer.sent.lock().unwrap().len(), 1);
}
