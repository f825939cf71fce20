pub mod os_id;
pub mod validation;

pub use os_id::OsId;
