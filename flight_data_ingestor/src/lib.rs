#[cfg(feature = "cli")]
pub mod cli;
pub mod crawl;
pub mod errors;
pub mod extract;
pub mod models;
pub mod navigator;
pub mod session;
