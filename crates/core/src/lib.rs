pub mod config;
pub mod error;
pub mod fs;

pub use config::{GeneralConfig, ProfileConfig, ProfilePaths};
pub use error::*;
