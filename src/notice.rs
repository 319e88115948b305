use serde::Serialize;

/// Severity of a message shown on the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    /// Action completed.
    Success,
    /// Action skipped or partially completed.
    Warning,
    /// Action failed.
    Error,
    /// Supplementary guidance.
    Info,
}

/// Message rendered as a banner in one of the form's tabs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    /// Banner severity.
    pub level: NoticeLevel,
    /// Banner text.
    pub text: String,
}

impl Notice {
    /// Success banner.
    pub fn success(text: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, text)
    }

    /// Warning banner.
    pub fn warning(text: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Warning, text)
    }

    /// Error banner.
    pub fn error(text: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, text)
    }

    /// Informational banner.
    pub fn info(text: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, text)
    }

    fn new(level: NoticeLevel, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
        }
    }
}
