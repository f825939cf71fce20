mod batch_session;

pub use batch_session::BatchSession;
