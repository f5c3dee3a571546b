use serde::Serialize;

/// One request's raw input. Lives for the duration of the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    RawText(String),
    PdfDocument(Vec<u8>),
    Image(Vec<u8>),
    AudioClip(Vec<u8>),
    ChatMessage(String),
}

impl InputSource {
    pub fn kind(&self) -> InputKind {
        match self {
            InputSource::RawText(_) => InputKind::Text,
            InputSource::PdfDocument(_) => InputKind::Pdf,
            InputSource::Image(_) => InputKind::Image,
            InputSource::AudioClip(_) => InputKind::Audio,
            InputSource::ChatMessage(_) => InputKind::Chat,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    Text,
    Pdf,
    Image,
    Audio,
    Chat,
}

impl InputKind {
    /// Source path segment for uploaded files.
    pub fn from_upload_slug(slug: &str) -> Option<Self> {
        match slug {
            "pdf" => Some(InputKind::Pdf),
            "image" => Some(InputKind::Image),
            "audio" => Some(InputKind::Audio),
            _ => None,
        }
    }

    /// Wraps uploaded bytes in the matching source. Text kinds are not uploads.
    pub fn wrap_upload(&self, bytes: Vec<u8>) -> Option<InputSource> {
        match self {
            InputKind::Pdf => Some(InputSource::PdfDocument(bytes)),
            InputKind::Image => Some(InputSource::Image(bytes)),
            InputKind::Audio => Some(InputSource::AudioClip(bytes)),
            InputKind::Text | InputKind::Chat => None,
        }
    }

    pub(crate) fn subject_label(&self) -> Option<&'static str> {
        match self {
            InputKind::Pdf => Some("PDF"),
            InputKind::Image => Some("Image"),
            InputKind::Audio => Some("Audio"),
            InputKind::Text | InputKind::Chat => None,
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            InputKind::Text => "text",
            InputKind::Pdf => "PDF document",
            InputKind::Image => "image",
            InputKind::Audio => "audio clip",
            InputKind::Chat => "chat message",
        }
    }
}

/// Flat UTF-8 text derived from an [`InputSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText(String);

impl NormalizedText {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_of_each_source() {
        assert_eq!(InputSource::RawText("a".into()).kind(), InputKind::Text);
        assert_eq!(InputSource::PdfDocument(vec![]).kind(), InputKind::Pdf);
        assert_eq!(InputSource::Image(vec![]).kind(), InputKind::Image);
        assert_eq!(InputSource::AudioClip(vec![]).kind(), InputKind::Audio);
        assert_eq!(InputSource::ChatMessage("".into()).kind(), InputKind::Chat);
    }

    #[test]
    fn test_upload_slugs() {
        assert_eq!(InputKind::from_upload_slug("pdf"), Some(InputKind::Pdf));
        assert_eq!(InputKind::from_upload_slug("text"), None);
        assert_eq!(
            InputKind::Audio.wrap_upload(vec![1, 2]),
            Some(InputSource::AudioClip(vec![1, 2]))
        );
        assert_eq!(InputKind::Chat.wrap_upload(vec![1]), None);
    }
}
