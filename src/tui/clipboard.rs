//! System clipboard access for copying code blocks

use arboard::Clipboard;

/// Lazily opened clipboard handle.
///
/// Opening can fail on headless systems; the failure is reported per copy
/// instead of aborting the session.
#[derive(Default)]
pub struct ClipboardHandler {
    clipboard: Option<Clipboard>,
}

impl ClipboardHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn copy_text(&mut self, text: &str) -> Result<(), arboard::Error> {
        if self.clipboard.is_none() {
            self.clipboard = Some(Clipboard::new()?);
        }
        match self.clipboard.as_mut() {
            Some(clipboard) => clipboard.set_text(text.to_string()),
            None => Err(arboard::Error::ClipboardNotSupported),
        }
    }
}
