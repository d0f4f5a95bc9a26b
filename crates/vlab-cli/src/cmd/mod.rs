pub mod config;
pub mod protocol;
pub mod serve;
pub mod submit;
