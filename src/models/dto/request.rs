use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("blank");
        error.message = Some("Text must not be empty".into());
        return Err(error);
    }
    Ok(())
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TextTaskRequest {
    #[validate(custom(function = "validate_not_blank"))]
    pub text: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
}

impl TextTaskRequest {
    /// A blank email field means "do not send".
    pub fn normalized(self) -> Self {
        Self {
            text: self.text,
            email: blank_to_none(self.email),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct FileTaskQuery {
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
}

impl FileTaskQuery {
    pub fn normalized(self) -> Self {
        Self {
            email: blank_to_none(self.email),
        }
    }
}

/// Form fields posted by the messaging provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatWebhookForm {
    #[serde(rename = "Body", default)]
    pub body: String,

    #[serde(rename = "From", default)]
    pub from: Option<String>,
}
