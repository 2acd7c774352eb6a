//! In-memory credential/settings store.
//!
//! Used as the injected substitute in tests and in embedded setups that
//! have no database file.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::repository::{CredentialRepository, SettingRepository};
use crate::error::Result;

#[derive(Default)]
pub struct MemoryRepository {
    credentials: Mutex<HashMap<(String, String), String>>,
    settings: Mutex<HashMap<String, String>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialRepository for MemoryRepository {
    async fn get_credentials(&self, domain: &str, name: &str) -> Result<Option<String>> {
        Ok(self
            .credentials
            .lock()
            .get(&(domain.to_string(), name.to_string()))
            .cloned())
    }

    async fn set_credentials(&self, domain: &str, name: &str, blob: &str) -> Result<()> {
        self.credentials
            .lock()
            .insert((domain.to_string(), name.to_string()), blob.to_string());
        Ok(())
    }

    async fn delete_credentials(&self, domain: &str, name: &str) -> Result<bool> {
        Ok(self
            .credentials
            .lock()
            .remove(&(domain.to_string(), name.to_string()))
            .is_some())
    }
}

#[async_trait]
impl SettingRepository for MemoryRepository {
    async fn get_setting(&self, key: &str) -> Result<Option<String>> {
        Ok(self.settings.lock().get(key).cloned())
    }

    async fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        self.settings
            .lock()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
