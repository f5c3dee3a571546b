//! Fixed instructional templates, one per task. `{text}` is the only slot.

pub const TEXT_SLOT: &str = "{text}";

/// System instruction sent with every hosted chat completion.
pub const STUDENT_ASSISTANT_SYSTEM_PROMPT: &str =
    "You are a friendly, intelligent assistant for students";

pub const SUMMARIZE_PROMPT: &str = "Summarize this text clearly and concisely, in 5 key points, avoiding repetition or invented information:\n{text}";

pub const GENERATE_EXERCISES_PROMPT: &str = "Create practice exercises about the following topic, each one followed by its worked answer. Number the exercises and keep them at a student level:\n{text}";

pub const ORGANIZE_TASKS_PROMPT: &str = "Organize these tasks by priority and due date, as an ordered list with the most urgent first:\n{text}";

pub const EXPLAIN_EXERCISE_PROMPT: &str = "Explain how to solve this exercise step by step, justifying each step in simple language:\n{text}";

pub const BUILD_PRESENTATION_PROMPT: &str = "Create a presentation outline about the following topic, with a title for each slide and its key points as bullets:\n{text}";

/// Reply sent to a chat user when generation fails. The webhook still answers 200.
pub const CHAT_FAILURE_REPLY: &str =
    "Sorry, I could not process your message right now. Please try again later.";

/// Substituted for an empty chat message.
pub const EMPTY_CHAT_PLACEHOLDER: &str = "No text received";
