use std::{panic::AssertUnwindSafe, sync::Arc};

use crate::{
    constants::prompts::EMPTY_CHAT_PLACEHOLDER,
    errors::ExtractionError,
    models::domain::{InputKind, InputSource, NormalizedText},
    services::engines::{OcrEngine, SpeechToText},
};

/// Turns any supported input into a single UTF-8 string.
pub struct NormalizerService {
    ocr: Arc<dyn OcrEngine>,
    speech: Arc<dyn SpeechToText>,
}

impl NormalizerService {
    pub fn new(ocr: Arc<dyn OcrEngine>, speech: Arc<dyn SpeechToText>) -> Self {
        Self { ocr, speech }
    }

    pub async fn normalize(&self, source: InputSource) -> Result<NormalizedText, ExtractionError> {
        let kind = source.kind();

        let text = match source {
            InputSource::RawText(text) => text,
            InputSource::ChatMessage(message) => normalize_chat_message(message),
            InputSource::PdfDocument(bytes) => {
                let pages = run_blocking(move || extract_pdf_pages(&bytes)).await?;
                log::info!("Extracted {} page(s) from PDF", pages.len());
                require_text(join_pages(&pages), kind)?
            }
            InputSource::Image(bytes) => {
                let text = self.recognize_image(bytes).await?;
                require_text(text, kind)?
            }
            InputSource::AudioClip(bytes) => {
                let text = self.transcribe_audio(bytes).await?;
                require_text(text, kind)?
            }
        };

        Ok(NormalizedText::new(text))
    }

    async fn recognize_image(&self, bytes: Vec<u8>) -> Result<String, ExtractionError> {
        let workdir = scratch_dir("smartclass-image-")?;
        let image_path = workdir.path().join("upload.png");

        let decoded_path = image_path.clone();
        run_blocking(move || {
            let image = image::load_from_memory(&bytes)
                .map_err(|e| ExtractionError::Image(e.to_string()))?;
            log::debug!("Decoded {}x{} image", image.width(), image.height());
            image
                .save(&decoded_path)
                .map_err(|e| ExtractionError::Image(e.to_string()))
        })
        .await?;

        self.ocr.recognize(&image_path).await
    }

    /// The clip and anything the engine writes beside it live in a scoped
    /// directory removed when this function returns, on every path.
    async fn transcribe_audio(&self, bytes: Vec<u8>) -> Result<String, ExtractionError> {
        let workdir = scratch_dir("smartclass-audio-")?;
        let audio_path = workdir.path().join("clip.wav");
        tokio::fs::write(&audio_path, &bytes).await?;
        log::debug!("Wrote {} byte audio clip for transcription", bytes.len());

        self.speech.transcribe(&audio_path).await
    }
}

fn scratch_dir(prefix: &str) -> Result<tempfile::TempDir, ExtractionError> {
    Ok(tempfile::Builder::new().prefix(prefix).tempdir()?)
}

/// Empty or whitespace-only chat messages become a fixed placeholder.
pub fn normalize_chat_message(message: String) -> String {
    if message.trim().is_empty() {
        EMPTY_CHAT_PLACEHOLDER.to_string()
    } else {
        message
    }
}

/// Concatenates page texts in order; empty pages contribute nothing.
pub fn join_pages(pages: &[String]) -> String {
    pages.concat()
}

fn require_text(text: String, kind: InputKind) -> Result<String, ExtractionError> {
    if text.trim().is_empty() {
        log::warn!("No text recovered from {}", kind.describe());
        return Err(ExtractionError::NoText(kind.describe()));
    }
    Ok(text)
}

/// Per-page text of an in-memory PDF.
///
/// The parser can panic on malformed fonts, so panics are caught and
/// reported as extraction errors.
pub fn extract_pdf_pages(bytes: &[u8]) -> Result<Vec<String>, ExtractionError> {
    match std::panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(bytes)
    })) {
        Ok(Ok(pages)) => Ok(pages),
        Ok(Err(e)) => {
            log::warn!("PDF extraction failed: {}", e);
            Err(ExtractionError::Pdf(e.to_string()))
        }
        Err(_) => {
            log::error!("PDF extraction panicked, likely a malformed font");
            Err(ExtractionError::Pdf(
                "the document could not be parsed".to_string(),
            ))
        }
    }
}

async fn run_blocking<T, F>(work: F) -> Result<T, ExtractionError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, ExtractionError> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ExtractionError::Io(format!("extraction worker failed: {}", e)))?
}
