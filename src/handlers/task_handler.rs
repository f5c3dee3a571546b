use actix_web::{post, web, HttpRequest, HttpResponse};
use validator::Validate;

use crate::{
    app_state::AppState,
    errors::{AppError, AppResult},
    middleware::get_request_id,
    models::{
        domain::{DeliveryTarget, InputKind, InputSource, TaskKind},
        dto::{
            request::{FileTaskQuery, TextTaskRequest},
            response::TaskResponse,
        },
    },
    services::pipeline_service::PipelineRequest,
};

fn parse_task(slug: &str) -> AppResult<TaskKind> {
    TaskKind::from_slug(slug).ok_or_else(|| AppError::NotFound(format!("Unknown task '{}'", slug)))
}

/// Runs a task on pasted text.
#[post("/api/tasks/{task}")]
pub async fn run_text_task(
    req: HttpRequest,
    state: web::Data<AppState>,
    task: web::Path<String>,
    request: web::Json<TextTaskRequest>,
) -> Result<HttpResponse, AppError> {
    let task = parse_task(&task)?;
    let request = request.into_inner().normalized();
    request.validate()?;

    log::info!("[{}] text {} request", get_request_id(&req), task);

    let output = state
        .pipeline
        .run(PipelineRequest {
            task,
            target: DeliveryTarget::from_email(request.email.as_deref()),
            source: InputSource::RawText(request.text),
        })
        .await?;

    Ok(HttpResponse::Ok().json(TaskResponse::from(output)))
}

/// Runs a task on an uploaded PDF, image or audio file sent as the raw body.
#[post("/api/tasks/{task}/{source}")]
pub async fn run_file_task(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    query: web::Query<FileTaskQuery>,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let (task, source) = path.into_inner();
    let task = parse_task(&task)?;
    let kind = InputKind::from_upload_slug(&source)
        .ok_or_else(|| AppError::NotFound(format!("Unknown upload type '{}'", source)))?;

    let query = query.into_inner().normalized();
    query.validate()?;

    if body.is_empty() {
        return Err(AppError::ValidationError("Uploaded file is empty".to_string()));
    }

    log::info!(
        "[{}] {} {} request ({} bytes)",
        get_request_id(&req),
        source,
        task,
        body.len()
    );

    let source = kind
        .wrap_upload(body.to_vec())
        .ok_or_else(|| AppError::InternalError(format!("{:?} is not an upload type", kind)))?;

    let output = state
        .pipeline
        .run(PipelineRequest {
            task,
            source,
            target: DeliveryTarget::from_email(query.email.as_deref()),
        })
        .await?;

    Ok(HttpResponse::Ok().json(TaskResponse::from(output)))
}
