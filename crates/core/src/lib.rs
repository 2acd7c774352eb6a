//! Dirgate Core — error type, configuration, credential/settings stores,
//! expiring cache, and XSRF token handling shared across Dirgate crates.

pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod xsrf;
