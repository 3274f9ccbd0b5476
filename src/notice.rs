use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A short message for the user, shown as a toast or printed by a CLI.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub title: &'static str,
    pub description: String,
    pub level: NoticeLevel,
}

impl Notice {
    fn info(title: &'static str, description: impl Into<String>) -> Self {
        Self {
            title,
            description: description.into(),
            level: NoticeLevel::Info,
        }
    }

    fn error(title: &'static str, description: impl Into<String>) -> Self {
        Self {
            title,
            description: description.into(),
            level: NoticeLevel::Error,
        }
    }

    pub(crate) fn image_selected(name: &str) -> Self {
        Self::info("Image Selected", format!("{name} is ready for analysis."))
    }

    pub(crate) fn invalid_file() -> Self {
        Self::error("Invalid File", "Please select a valid image file.")
    }

    pub(crate) fn no_input() -> Self {
        Self::error("No Input", "Please select an image file or provide a URL.")
    }

    pub(crate) fn analysis_complete() -> Self {
        Self::info(
            "Analysis Complete!",
            "Successfully classified waste materials in the image.",
        )
    }

    pub(crate) fn analysis_failed() -> Self {
        Self::error("Analysis Failed", crate::ANALYSIS_FAILED_MESSAGE)
    }

    pub(crate) fn copied() -> Self {
        Self::info("Copied!", "Results copied to clipboard.")
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.description)
    }
}
