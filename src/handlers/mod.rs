pub mod health_handler;
pub mod task_handler;
pub mod webhook_handler;

pub use health_handler::{health_check, health_check_live};
pub use task_handler::{run_file_task, run_text_task};
pub use webhook_handler::chat_webhook;
