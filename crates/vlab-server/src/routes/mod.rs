pub mod analytics;
pub mod catalog;
pub mod deploy;
pub mod docs;
pub mod protocol;
