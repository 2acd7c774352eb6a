//! XSRF token minting and validation for authenticated users.
//!
//! Tokens are HMAC-SHA256 digests of the user id under a per-instance
//! secret. The secret is provisioned lazily: generated on first use,
//! persisted to the settings store, and memoized in the expiring cache.
//! It must not be rotated casually, as that invalidates all issued tokens.

use std::sync::Arc;
use std::time::Duration;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use rand::Rng;
use sha2::Sha256;
use tracing::{debug, error};

use crate::cache::ExpiringCache;
use crate::db::repository::SettingRepository;
use crate::error::Result;

type HmacSha256 = Hmac<Sha256>;

const XSRF_SECRET_SETTING: &str = "xsrf_secret";
const XSRF_SECRET_CACHE_TTL: Duration = Duration::from_secs(3600);

/// Mints and validates per-user XSRF tokens.
pub struct XsrfProtect {
    settings: Arc<dyn SettingRepository>,
    cache: Arc<dyn ExpiringCache>,
}

impl XsrfProtect {
    pub fn new(settings: Arc<dyn SettingRepository>, cache: Arc<dyn ExpiringCache>) -> Self {
        Self { settings, cache }
    }

    /// Mint an XSRF token for the given user id.
    pub async fn token(&self, user_id: &str) -> Result<String> {
        let secret = self.secret().await?;
        let mut mac = <HmacSha256 as Mac>::new_from_slice(secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(user_id.as_bytes());
        Ok(URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes()))
    }

    /// Validate a token presented by the given user.
    ///
    /// Comparison happens in constant time via the MAC verifier. A token
    /// that fails to decode validates false rather than erroring.
    pub async fn validate(&self, user_id: &str, token: &str) -> Result<bool> {
        let Ok(presented) = URL_SAFE_NO_PAD.decode(token) else {
            error!("xsrf token does not decode");
            return Ok(false);
        };

        let secret = self.secret().await?;
        let mut mac = <HmacSha256 as Mac>::new_from_slice(secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(user_id.as_bytes());
        match mac.verify_slice(&presented) {
            Ok(()) => Ok(true),
            Err(_) => {
                error!("xsrf token does not validate");
                Ok(false)
            }
        }
    }

    /// Retrieve the XSRF secret: cache first, then the settings store,
    /// generating and persisting a fresh one if none exists yet.
    async fn secret(&self) -> Result<String> {
        if let Some(secret) = self.cache.get(XSRF_SECRET_SETTING).await {
            return Ok(secret);
        }

        let secret = match self.settings.get_setting(XSRF_SECRET_SETTING).await? {
            Some(secret) => secret,
            None => {
                debug!("no xsrf secret found, generating one");
                let secret = generate_secret();
                self.settings
                    .set_setting(XSRF_SECRET_SETTING, &secret)
                    .await?;
                secret
            }
        };

        self.cache
            .set(XSRF_SECRET_SETTING, &secret, XSRF_SECRET_CACHE_TTL)
            .await;
        Ok(secret)
    }
}

/// Generate a random XSRF secret (32 hex characters).
fn generate_secret() -> String {
    let mut rng = rand::thread_rng();
    let bytes: Vec<u8> = (0..16).map(|_| rng.gen()).collect();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::db::memory::MemoryRepository;

    fn setup() -> XsrfProtect {
        XsrfProtect::new(Arc::new(MemoryRepository::new()), Arc::new(MemoryCache::new()))
    }

    #[test]
    fn generate_secret_is_32_hex_chars() {
        let secret = generate_secret();
        assert_eq!(secret.len(), 32);
        assert!(secret.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn generate_secret_is_unique() {
        assert_ne!(generate_secret(), generate_secret());
    }

    #[tokio::test]
    async fn token_validates_for_same_user() {
        let xsrf = setup();
        let token = xsrf.token("user-123").await.unwrap();
        assert!(xsrf.validate("user-123", &token).await.unwrap());
    }

    #[tokio::test]
    async fn token_rejected_for_other_user() {
        let xsrf = setup();
        let token = xsrf.token("user-123").await.unwrap();
        assert!(!xsrf.validate("user-456", &token).await.unwrap());
    }

    #[tokio::test]
    async fn tampered_token_rejected() {
        let xsrf = setup();
        let mut token = xsrf.token("user-123").await.unwrap();
        token.push('A');
        assert!(!xsrf.validate("user-123", &token).await.unwrap());
    }

    #[tokio::test]
    async fn undecodable_token_rejected() {
        let xsrf = setup();
        assert!(!xsrf.validate("user-123", "not!!!base64%%%").await.unwrap());
    }

    #[tokio::test]
    async fn token_is_deterministic_per_user() {
        let xsrf = setup();
        let first = xsrf.token("user-123").await.unwrap();
        let second = xsrf.token("user-123").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn secret_is_persisted_to_settings() {
        let settings = Arc::new(MemoryRepository::new());
        let xsrf = XsrfProtect::new(settings.clone(), Arc::new(MemoryCache::new()));

        xsrf.token("user-123").await.unwrap();

        let stored = settings.get_setting("xsrf_secret").await.unwrap();
        assert!(stored.is_some());
        assert_eq!(stored.unwrap().len(), 32);
    }

    #[tokio::test]
    async fn existing_secret_is_reused() {
        let settings = Arc::new(MemoryRepository::new());
        settings
            .set_setting("xsrf_secret", "feedfacefeedfacefeedfacefeedface")
            .await
            .unwrap();
        let xsrf = XsrfProtect::new(settings.clone(), Arc::new(MemoryCache::new()));

        let token = xsrf.token("user-123").await.unwrap();
        assert!(xsrf.validate("user-123", &token).await.unwrap());
        assert_eq!(
            settings.get_setting("xsrf_secret").await.unwrap().as_deref(),
            Some("feedfacefeedfacefeedfacefeedface")
        );
    }
}
