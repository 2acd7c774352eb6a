//! Dirgate Directory — credential-managed shim over the Google Admin
//! Directory API.
//!
//! This crate resolves OAuth credentials (explicit, stored, or service
//! account key file), builds an authorized Directory API client, exposes
//! per-user record get/update, and answers admin-group membership with a
//! short-lived cache of admin emails.

pub mod admin;
pub mod auth;
pub mod client;
pub mod models;
pub mod service;
