pub mod catalog_embedded;
pub mod clipboard_arboard;
pub mod memory_state_store;
pub mod state_filesystem;

pub use catalog_embedded::EmbeddedOsCatalog;
pub use clipboard_arboard::ArboardClipboardWriter;
pub use memory_state_store::MemoryStateStore;
pub use state_filesystem::{FilesystemStateStore, STATE_DIR};
