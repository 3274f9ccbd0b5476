use crate::error::ClassifyError;

/// Somewhere result text can be copied to.
pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClassifyError>;
}

/// Keeps the last copied text in memory.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    contents: Option<String>,
    writes: usize,
}

impl MemoryClipboard {
    pub fn contents(&self) -> Option<&str> {
        self.contents.as_deref()
    }

    /// How many times text has been written.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl Clipboard for MemoryClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClassifyError> {
        self.contents = Some(text.to_string());
        self.writes += 1;
        Ok(())
    }
}

/// The desktop clipboard.
#[cfg(feature = "clipboard")]
pub struct SystemClipboard(arboard::Clipboard);

#[cfg(feature = "clipboard")]
impl SystemClipboard {
    pub fn new() -> Result<Self, ClassifyError> {
        arboard::Clipboard::new()
            .map(Self)
            .map_err(|e| ClassifyError::Clipboard(e.to_string()))
    }
}

#[cfg(feature = "clipboard")]
impl Clipboard for SystemClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClassifyError> {
        self.0
            .set_text(text)
            .map_err(|e| ClassifyError::Clipboard(e.to_string()))
    }
}
