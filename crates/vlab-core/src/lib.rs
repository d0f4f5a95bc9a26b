pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod io;
pub mod pipeline;
pub mod protocol;
pub mod rule;
pub mod service;

pub use error::{ProviderError, Result};
