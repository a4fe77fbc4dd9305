mod session;
mod shared_document;

pub use session::*;
pub use shared_document::*;
