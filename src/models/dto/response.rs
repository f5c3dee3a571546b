use serde::Serialize;

use crate::{
    models::domain::{DispatchOutcome, InputKind, TaskKind},
    services::pipeline_service::PipelineOutput,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    NotRequested,
    Sent,
    Failed,
    ChatReply,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeliveryReport {
    pub status: DeliveryStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl From<&DispatchOutcome> for DeliveryReport {
    fn from(outcome: &DispatchOutcome) -> Self {
        match outcome {
            DispatchOutcome::Displayed(_) => DeliveryReport {
                status: DeliveryStatus::NotRequested,
                recipient: None,
                detail: None,
            },
            DispatchOutcome::ChatReply(_) => DeliveryReport {
                status: DeliveryStatus::ChatReply,
                recipient: None,
                detail: None,
            },
            DispatchOutcome::Emailed { recipient, status } => DeliveryReport {
                status: DeliveryStatus::Sent,
                recipient: Some(recipient.clone()),
                detail: Some(format!("provider answered {}", status)),
            },
            DispatchOutcome::DeliveryFailed { recipient, error } => DeliveryReport {
                status: DeliveryStatus::Failed,
                recipient: Some(recipient.clone()),
                detail: Some(error.to_string()),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskResponse {
    pub task: TaskKind,
    pub input: InputKind,
    pub result: String,
    pub delivery: DeliveryReport,
}

impl From<PipelineOutput> for TaskResponse {
    fn from(output: PipelineOutput) -> Self {
        TaskResponse {
            task: output.task,
            input: output.input,
            delivery: DeliveryReport::from(&output.outcome),
            result: output.result.into_inner(),
        }
    }
}
