//! Periodic crawl-and-cache orchestration for Korean airport flight data.

#![deny(missing_docs)]

pub mod config;
pub mod kst;
pub mod refresh;
pub mod scheduler;
pub mod service;
pub mod store;
