//! External recognition engines used by the normalizer.
//!
//! OCR runs the Tesseract command-line tool per image. Speech-to-text talks
//! to a whisper.cpp server that keeps its model loaded. Both handles are
//! built once at startup and shared.

use std::{path::Path, process::Output};

use async_trait::async_trait;
use tokio::process::Command;

use crate::errors::ExtractionError;

pub mod ocr;
pub mod speech;

pub use ocr::TesseractOcr;
pub use speech::WhisperTranscriber;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Best-effort text found in the image at `image_path`. May be empty.
    async fn recognize(&self, image_path: &Path) -> Result<String, ExtractionError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpeechToText: Send + Sync {
    /// Transcript of the audio file at `audio_path`.
    async fn transcribe(&self, audio_path: &Path) -> Result<String, ExtractionError>;
}

/// Runs `program` to completion, returning its output when it exits successfully.
pub(crate) async fn run_tool(program: &str, args: &[&std::ffi::OsStr]) -> Result<Output, String> {
    log::debug!("Running {} with {} argument(s)", program, args.len());

    let output = Command::new(program)
        .args(args)
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| format!("could not start '{}': {}", program, e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!(
            "'{}' exited with {}: {}",
            program,
            output.status,
            stderr.trim()
        ));
    }

    Ok(output)
}

/// Whether `program` can be spawned at all. Used for startup diagnostics.
pub(crate) async fn tool_available(program: &str, check_flag: &str) -> bool {
    Command::new(program)
        .arg(check_flag)
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .await
        .is_ok()
}
