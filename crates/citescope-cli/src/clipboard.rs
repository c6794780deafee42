use citescope_science::{ClipboardSink, ScienceError};

/// System clipboard via `arboard`.
pub struct SystemClipboard {
    inner: arboard::Clipboard,
}

impl SystemClipboard {
    pub fn open() -> Result<Self, ScienceError> {
        let inner = arboard::Clipboard::new().map_err(|e| ScienceError::Clipboard(e.to_string()))?;
        Ok(Self { inner })
    }
}

impl ClipboardSink for SystemClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ScienceError> {
        self.inner
            .set_text(text.to_string())
            .map_err(|e| ScienceError::Clipboard(e.to_string()))
    }
}
