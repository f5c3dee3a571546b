use crate::{
    constants::prompts::TEXT_SLOT,
    models::domain::{NormalizedText, Prompt, TaskKind},
};

/// Embeds `text` in the template for `task`. Pure; no length checks.
pub fn build_prompt(task: TaskKind, text: &NormalizedText) -> Prompt {
    Prompt::new(task.template().replacen(TEXT_SLOT, text.as_str(), 1))
}
