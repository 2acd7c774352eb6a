//! Admin-group membership checks with a short-lived admin email cache.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use dirgate_core::cache::ExpiringCache;
use dirgate_core::db::repository::{
    CredentialRepository, DirgateRepository, SettingRepository, CREDENTIALS_NAME,
};
use dirgate_core::error::{DirgateError, Result};

use crate::models::UserRecord;
use crate::service::ServiceBuilder;

/// Settings key for the admin group address.
pub const ADMIN_GROUP_SETTING: &str = "admin_group";
/// Cache key suffix; full key is `{domain}:admins`.
pub const ADMIN_CACHE_KEY: &str = "admins";
pub const ADMIN_CACHE_TTL: Duration = Duration::from_secs(600);

/// Answers directory record lookups and admin-group membership for one
/// managed domain.
///
/// A cached admin email list is authoritative for its TTL window, even
/// when empty; absence of the cache entry means "unknown" and triggers a
/// group listing call.
pub struct AdminGroupChecker<R: DirgateRepository> {
    repo: Arc<R>,
    builder: ServiceBuilder,
    cache: Arc<dyn ExpiringCache>,
    domain: String,
}

impl<R: DirgateRepository> AdminGroupChecker<R> {
    pub fn new(
        repo: Arc<R>,
        builder: ServiceBuilder,
        cache: Arc<dyn ExpiringCache>,
        domain: &str,
    ) -> Self {
        Self {
            repo,
            builder,
            cache,
            domain: domain.to_string(),
        }
    }

    /// Fetch a user's directory record. No local caching.
    pub async fn get_user_info(&self, email: &str) -> Result<UserRecord> {
        debug!(%email, "getting domain info");
        let client = self.builder.build(&*self.repo, None).await?;
        client.get_user(email).await
    }

    /// Push a new directory record for the user.
    pub async fn update_user_info(&self, email: &str, record: &UserRecord) -> Result<()> {
        debug!(%email, "updating domain info");
        let client = self.builder.build(&*self.repo, None).await?;
        client.update_user(email, record).await
    }

    /// Determine whether the user is a domain admin or a member of the
    /// configured admin group.
    ///
    /// A rejected token refresh deletes the stored credentials and
    /// surfaces as a setup-needed error; any other remote failure
    /// propagates unchanged.
    pub async fn is_in_admin_group(&self, email: &str) -> Result<bool> {
        let user_info = match self.get_user_info(email).await {
            Ok(record) => record,
            Err(DirgateError::TokenRefresh(_)) => {
                self.repo
                    .delete_credentials(&self.domain, CREDENTIALS_NAME)
                    .await?;
                return Err(DirgateError::SetupNeeded("oauth token no longer valid".into()));
            }
            Err(e) => return Err(e),
        };

        if user_info
            .get("isAdmin")
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
        {
            info!("user is a domain admin");
            return Ok(true);
        }

        debug!(%email, "checking admin group membership");
        let Some(admin_group) = self.repo.get_setting(ADMIN_GROUP_SETTING).await? else {
            return Err(DirgateError::Config(
                "the admin_group setting must be configured".into(),
            ));
        };

        let cache_key = format!("{}:{}", self.domain, ADMIN_CACHE_KEY);
        if let Some(cached) = self.cache.get(&cache_key).await {
            debug!("admin emails found in cache");
            let admin_emails: Vec<String> = serde_json::from_str(&cached).map_err(|e| {
                DirgateError::Directory(format!("cached admin list is unreadable: {e}"))
            })?;
            return Ok(admin_emails.iter().any(|a| a == email));
        }

        debug!("admin emails not found in cache");
        let admin_emails = self.fetch_admin_emails(&admin_group, &cache_key).await?;
        Ok(admin_emails.iter().any(|a| a == email))
    }

    /// List the admin group's member emails and cache them.
    async fn fetch_admin_emails(&self, admin_group: &str, cache_key: &str) -> Result<Vec<String>> {
        let client = self.builder.build(&*self.repo, None).await?;
        let members = client.list_group_members(admin_group).await?;
        let admin_emails: Vec<String> = members.into_iter().map(|m| m.email).collect();

        let encoded = serde_json::to_string(&admin_emails)
            .map_err(|e| DirgateError::Directory(format!("admin list encode failed: {e}")))?;
        self.cache.set(cache_key, &encoded, ADMIN_CACHE_TTL).await;
        Ok(admin_emails)
    }
}
