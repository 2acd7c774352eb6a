use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use super::repository::{CredentialRepository, SettingRepository};
use crate::error::Result;

#[derive(Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl CredentialRepository for SqliteRepository {
    async fn get_credentials(&self, domain: &str, name: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT blob FROM credentials WHERE domain = ?1 AND name = ?2")
            .bind(domain)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| r.get("blob")))
    }

    async fn set_credentials(&self, domain: &str, name: &str, blob: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO credentials (domain, name, blob, updated_at) VALUES (?1, ?2, ?3, datetime('now'))
             ON CONFLICT(domain, name) DO UPDATE SET blob = excluded.blob, updated_at = excluded.updated_at",
        )
        .bind(domain)
        .bind(name)
        .bind(blob)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_credentials(&self, domain: &str, name: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM credentials WHERE domain = ?1 AND name = ?2")
            .bind(domain)
            .bind(name)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl SettingRepository for SqliteRepository {
    async fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT value FROM settings WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| r.get("value")))
    }

    async fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO settings (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
