use crate::domain::AppError;

/// Destination for copy-pasteable commands.
///
/// Implementations report `AppError::ClipboardUnavailable` when no clipboard
/// can be reached. Callers treat that as a warning, never as a batch error.
pub trait ClipboardWriter {
    fn copy_command(&mut self, command: &str) -> Result<(), AppError>;
}
