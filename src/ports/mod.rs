mod clipboard_writer;
mod os_catalog;
mod state_store;

pub use clipboard_writer::ClipboardWriter;
pub use os_catalog::OsCatalog;
pub use state_store::{StateKey, StateStore};
