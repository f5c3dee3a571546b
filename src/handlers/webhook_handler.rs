use actix_web::{post, web, HttpRequest, HttpResponse};

use crate::{
    app_state::AppState,
    constants::prompts::CHAT_FAILURE_REPLY,
    middleware::get_request_id,
    models::{
        domain::{DeliveryTarget, DispatchOutcome, InputSource, TaskKind},
        dto::request::ChatWebhookForm,
    },
    services::{
        dispatch_service::chat_reply, http_helpers::twiml_reply,
        pipeline_service::PipelineRequest,
    },
};

/// Task applied to every inbound chat message.
pub const CHAT_TASK: TaskKind = TaskKind::OrganizeTasks;

/// Inbound messaging webhook. Always answers 200 with a reply envelope,
/// whatever happened during generation.
#[post("/whatsapp")]
pub async fn chat_webhook(
    req: HttpRequest,
    state: web::Data<AppState>,
    form: Option<web::Form<ChatWebhookForm>>,
) -> HttpResponse {
    let request_id = get_request_id(&req);
    let form = form.map(|f| f.into_inner()).unwrap_or_default();

    log::info!(
        "[{}] chat message from {}",
        request_id,
        form.from.as_deref().unwrap_or("unknown sender")
    );

    let request = PipelineRequest {
        task: CHAT_TASK,
        source: InputSource::ChatMessage(form.body),
        target: DeliveryTarget::ChatReplyHandle,
    };

    let reply = match state.pipeline.run(request).await {
        Ok(output) => match output.outcome {
            DispatchOutcome::ChatReply(body) => body,
            _ => chat_reply(output.task, &output.result),
        },
        Err(err) => {
            log::error!("[{}] chat request failed: {}", request_id, err);
            CHAT_FAILURE_REPLY.to_string()
        }
    };

    twiml_reply(&reply)
}
