use async_trait::async_trait;

use crate::error::Result;

/// Fixed name under which the domain's OAuth credential blob is stored.
pub const CREDENTIALS_NAME: &str = "credentials";

/// Storage for opaque credential blobs, keyed by (domain, name).
///
/// The blob is whatever the setup flow serialized; this crate never
/// interprets it beyond passing it to the credential provider.
#[async_trait]
pub trait CredentialRepository: Send + Sync {
    async fn get_credentials(&self, domain: &str, name: &str) -> Result<Option<String>>;
    async fn set_credentials(&self, domain: &str, name: &str, blob: &str) -> Result<()>;
    /// Returns true if a blob existed and was deleted.
    async fn delete_credentials(&self, domain: &str, name: &str) -> Result<bool>;
}

/// Key-value settings written by the setup/admin flows and read here
/// (e.g. `admin_group`, `xsrf_secret`).
#[async_trait]
pub trait SettingRepository: Send + Sync {
    async fn get_setting(&self, key: &str) -> Result<Option<String>>;
    async fn set_setting(&self, key: &str, value: &str) -> Result<()>;
}

/// Combined repository trait for everything the directory shim needs.
pub trait DirgateRepository: CredentialRepository + SettingRepository {}

impl<T: CredentialRepository + SettingRepository> DirgateRepository for T {}
