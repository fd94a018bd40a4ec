use serde::{Deserialize, Serialize};

/// Tone of a transient message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Success,
    Error,
}

/// A transient message for the caller's notification surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    pub fn success(text: &str) -> Self {
        Self {
            kind: NoticeKind::Success,
            text: text.to_string(),
        }
    }

    pub fn error(text: &str) -> Self {
        Self {
            kind: NoticeKind::Error,
            text: text.to_string(),
        }
    }
}

/// Fire-and-forget notification collaborator.
///
/// The catalog decides what message to show and when; rendering and
/// delivery belong to the platform shell. Delivery is not allowed to fail
/// the operation that triggered it, hence no error return.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}
