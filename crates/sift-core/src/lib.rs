pub mod config;
pub mod error;
pub mod types;

pub use config::SiftConfig;
pub use error::{Result, SiftError};
pub use types::*;
