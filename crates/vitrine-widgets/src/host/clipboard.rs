//! System clipboard access.

use vitrine_types::error::{Result, VitrineError};

pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> Result<()>;
    fn read_text(&self) -> Result<Option<String>>;
}

/// Clipboard held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    contents: Option<String>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clipboard for MemoryClipboard {
    fn write_text(&mut self, text: &str) -> Result<()> {
        self.contents = Some(text.to_string());
        Ok(())
    }

    fn read_text(&self) -> Result<Option<String>> {
        Ok(self.contents.clone())
    }
}

/// A clipboard the host refused access to. Every call fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableClipboard;

impl Clipboard for UnavailableClipboard {
    fn write_text(&mut self, _text: &str) -> Result<()> {
        Err(VitrineError::Clipboard("clipboard unavailable".into()))
    }

    fn read_text(&self) -> Result<Option<String>> {
        Err(VitrineError::Clipboard("clipboard unavailable".into()))
    }
}
