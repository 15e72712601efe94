pub mod anchor;
pub mod client;
pub mod config;
pub mod error;
pub mod export;
pub mod filters;
pub mod models;
pub mod muster;
pub mod report;
pub mod session;

pub use error::{AppError, Result};
