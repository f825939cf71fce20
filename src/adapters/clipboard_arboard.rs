use arboard::Clipboard;

use crate::domain::AppError;
use crate::ports::ClipboardWriter;

/// System clipboard through `arboard`.
///
/// The connection is opened on first write, so constructing the writer never
/// fails on hosts without a display server.
#[derive(Default)]
pub struct ArboardClipboardWriter {
    clipboard: Option<Clipboard>,
}

impl ArboardClipboardWriter {
    pub fn new() -> Self {
        Self::default()
    }

    fn connection(&mut self) -> Result<&mut Clipboard, AppError> {
        if self.clipboard.is_none() {
            let clipboard =
                Clipboard::new().map_err(|e| AppError::ClipboardUnavailable(e.to_string()))?;
            self.clipboard = Some(clipboard);
        }
        self.clipboard
            .as_mut()
            .ok_or_else(|| AppError::ClipboardUnavailable("clipboard not initialized".to_string()))
    }
}

impl ClipboardWriter for ArboardClipboardWriter {
    fn copy_command(&mut self, command: &str) -> Result<(), AppError> {
        self.connection()?
            .set_text(command)
            .map_err(|e| AppError::ClipboardUnavailable(e.to_string()))
    }
}
