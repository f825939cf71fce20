use crate::domain::AppError;
use crate::ports::ClipboardWriter;

/// Records every copied command; optionally behaves like a headless host.
#[derive(Default)]
pub struct MockClipboard {
    copies: Vec<String>,
    unavailable: Option<String>,
}

impl MockClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn headless(reason: &str) -> Self {
        Self { copies: Vec::new(), unavailable: Some(reason.to_string()) }
    }

    pub fn copies(&self) -> &[String] {
        &self.copies
    }

    pub fn last(&self) -> Option<&str> {
        self.copies.last().map(String::as_str)
    }
}

impl ClipboardWriter for MockClipboard {
    fn copy_command(&mut self, command: &str) -> Result<(), AppError> {
        if let Some(reason) = &self.unavailable {
            return Err(AppError::ClipboardUnavailable(reason.clone()));
        }
        self.copies.push(command.to_string());
        Ok(())
    }
}
