use crate::errors::DeliveryError;

/// Where a result goes after generation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DeliveryTarget {
    #[default]
    None,
    EmailAddress(String),
    ChatReplyHandle,
}

impl DeliveryTarget {
    /// Blank addresses mean "display only".
    pub fn from_email(email: Option<&str>) -> Self {
        match email.map(str::trim) {
            Some(address) if !address.is_empty() => DeliveryTarget::EmailAddress(address.to_string()),
            _ => DeliveryTarget::None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Displayed(String),
    Emailed { recipient: String, status: u16 },
    ChatReply(String),
    DeliveryFailed { recipient: String, error: DeliveryError },
}

impl DispatchOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, DispatchOutcome::DeliveryFailed { .. })
    }
}
