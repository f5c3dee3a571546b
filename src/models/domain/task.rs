use serde::{Deserialize, Serialize};

use crate::{constants::prompts, models::domain::input::InputKind};

/// The five things a student can ask for. Each owns one fixed template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskKind {
    #[serde(rename = "summarize")]
    Summarize,
    #[serde(rename = "exercises")]
    GenerateExercises,
    #[serde(rename = "tasks")]
    OrganizeTasks,
    #[serde(rename = "explain")]
    ExplainExercise,
    #[serde(rename = "presentation")]
    BuildPresentation,
}

impl TaskKind {
    pub const ALL: [TaskKind; 5] = [
        TaskKind::Summarize,
        TaskKind::GenerateExercises,
        TaskKind::OrganizeTasks,
        TaskKind::ExplainExercise,
        TaskKind::BuildPresentation,
    ];

    /// Path segment used by the task API.
    pub fn slug(&self) -> &'static str {
        match self {
            TaskKind::Summarize => "summarize",
            TaskKind::GenerateExercises => "exercises",
            TaskKind::OrganizeTasks => "tasks",
            TaskKind::ExplainExercise => "explain",
            TaskKind::BuildPresentation => "presentation",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|task| task.slug() == slug)
    }

    pub fn template(&self) -> &'static str {
        match self {
            TaskKind::Summarize => prompts::SUMMARIZE_PROMPT,
            TaskKind::GenerateExercises => prompts::GENERATE_EXERCISES_PROMPT,
            TaskKind::OrganizeTasks => prompts::ORGANIZE_TASKS_PROMPT,
            TaskKind::ExplainExercise => prompts::EXPLAIN_EXERCISE_PROMPT,
            TaskKind::BuildPresentation => prompts::BUILD_PRESENTATION_PROMPT,
        }
    }

    fn title(&self) -> &'static str {
        match self {
            TaskKind::Summarize => "Summary",
            TaskKind::GenerateExercises => "Exercises",
            TaskKind::OrganizeTasks => "Organized Tasks",
            TaskKind::ExplainExercise => "Explanation",
            TaskKind::BuildPresentation => "Presentation",
        }
    }

    /// Email subject, e.g. "SmartClass Summary" or "SmartClass PDF Summary".
    pub fn email_subject(&self, input: InputKind) -> String {
        match input.subject_label() {
            Some(label) => format!("SmartClass {} {}", label, self.title()),
            None => format!("SmartClass {}", self.title()),
        }
    }

    /// First line of a chat reply.
    pub fn reply_header(&self) -> &'static str {
        match self {
            TaskKind::Summarize => "📝 *Summary*",
            TaskKind::GenerateExercises => "✏️ *Exercises*",
            TaskKind::OrganizeTasks => "📅 *Organized tasks*",
            TaskKind::ExplainExercise => "💡 *Step-by-step explanation*",
            TaskKind::BuildPresentation => "📊 *Presentation outline*",
        }
    }
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}
