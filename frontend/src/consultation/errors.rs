use thiserror::Error;

/// One field failed its checks; shown inline next to that field.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{field}: {message}")]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StepError {
    #[error("{} field(s) need attention", .0.len())]
    Invalid(Vec<FieldError>),
    #[error("already on the last step")]
    LastStep,
    #[error("submission is only possible from the last step")]
    NotOnLastStep,
    #[error("a submission is already in flight")]
    SubmissionInFlight,
    #[error("this consultation request was already submitted")]
    AlreadySubmitted,
    #[error("the form session has been closed")]
    SessionClosed,
    #[error("the form has no steps to fill in")]
    NoSteps,
}

impl StepError {
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            StepError::Invalid(errors) => errors,
            _ => &[],
        }
    }
}

/// Storage failures; progress saving is a convenience, so these are only logged.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("browser storage is unavailable")]
    Unavailable,
    #[error("storage rejected the write: {0}")]
    Write(String),
    #[error("snapshot is not valid JSON: {0}")]
    Serde(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct SubmissionError {
    pub message: String,
}

impl SubmissionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
