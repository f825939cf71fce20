mod catalog;
mod failing_state_store;
mod mock_clipboard;

pub use catalog::TestCatalog;
pub use failing_state_store::FailingStateStore;
pub use mock_clipboard::MockClipboard;
