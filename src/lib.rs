pub mod chain;
pub mod config;
pub mod deploy;
pub mod error;
pub mod factory;
pub mod safe;
pub mod utils;

pub type Result<T> = std::result::Result<T, error::Error>;
