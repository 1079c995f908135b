pub mod message;
pub mod event;
pub mod identity;
pub mod config;
pub mod error;
pub mod session;


pub use error::{ChatError, ErrorKind};
pub type Result<T> = std::result::Result<T, ChatError>;
