//! Database models, schema bootstrap and document import

pub mod documents;
pub mod import;
pub mod init;
pub mod models;

pub use documents::*;
pub use import::*;
pub use init::*;
pub use models::*;
