use std::{ffi::OsStr, path::Path};

use async_trait::async_trait;

use super::{run_tool, tool_available, OcrEngine};
use crate::errors::ExtractionError;

/// OCR through the `tesseract` binary, writing recognized text to stdout.
pub struct TesseractOcr {
    binary: String,
    languages: String,
}

impl TesseractOcr {
    pub fn new(binary: impl Into<String>, languages: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            languages: languages.into(),
        }
    }

    pub async fn is_available(&self) -> bool {
        tool_available(&self.binary, "--version").await
    }
}

#[async_trait]
impl OcrEngine for TesseractOcr {
    async fn recognize(&self, image_path: &Path) -> Result<String, ExtractionError> {
        let args: [&OsStr; 4] = [
            image_path.as_os_str(),
            OsStr::new("stdout"),
            OsStr::new("-l"),
            OsStr::new(&self.languages),
        ];

        let output = run_tool(&self.binary, &args)
            .await
            .map_err(ExtractionError::Ocr)?;

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        log::info!("OCR recognized {} characters", text.trim().len());
        Ok(text)
    }
}
