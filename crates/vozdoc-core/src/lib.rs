pub mod config;
pub mod error;
pub mod types;

pub use config::VozdocConfig;
pub use error::{Result, VozdocError};
pub use types::*;
