use std::sync::Arc;

use crate::{
    errors::AppResult,
    models::domain::{
        DeliveryTarget, DispatchOutcome, GenerationOptions, GenerationResult, InputKind,
        InputSource, TaskKind,
    },
    services::{
        dispatch_service::DispatchService, model_service::TextGenerator,
        normalizer_service::NormalizerService, prompt_service::build_prompt,
    },
};

#[derive(Debug, Clone)]
pub struct PipelineRequest {
    pub task: TaskKind,
    pub source: InputSource,
    pub target: DeliveryTarget,
}

#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub task: TaskKind,
    pub input: InputKind,
    pub result: GenerationResult,
    pub outcome: DispatchOutcome,
}

/// normalize → build prompt → generate → dispatch, one request at a time.
pub struct PipelineService {
    normalizer: Arc<NormalizerService>,
    generator: Arc<dyn TextGenerator>,
    dispatcher: Arc<DispatchService>,
    options: GenerationOptions,
}

impl PipelineService {
    pub fn new(
        normalizer: Arc<NormalizerService>,
        generator: Arc<dyn TextGenerator>,
        dispatcher: Arc<DispatchService>,
        options: GenerationOptions,
    ) -> Self {
        Self {
            normalizer,
            generator,
            dispatcher,
            options,
        }
    }

    pub fn generator(&self) -> &Arc<dyn TextGenerator> {
        &self.generator
    }

    /// Extraction and backend failures abort the request. Delivery failures
    /// are reported in the outcome and leave the result intact.
    pub async fn run(&self, request: PipelineRequest) -> AppResult<PipelineOutput> {
        let PipelineRequest {
            task,
            source,
            target,
        } = request;
        let input = source.kind();

        log::info!("Running {} task on {} input", task, input.describe());

        let text = self.normalizer.normalize(source).await?;
        let prompt = build_prompt(task, &text);
        let result = self.generator.generate(&prompt, &self.options).await?;

        log::info!("Generated {} characters for {} task", result.as_str().len(), task);

        let subject = task.email_subject(input);
        let outcome = self
            .dispatcher
            .dispatch(&result, &target, task, &subject)
            .await;

        Ok(PipelineOutput {
            task,
            input,
            result,
            outcome,
        })
    }
}
