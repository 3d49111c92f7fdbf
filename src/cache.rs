//! Redis client wiring.

use redis::aio::ConnectionManager;
use redis::{AsyncCommands, ConnectionAddr, ConnectionInfo, RedisConnectionInfo};
use thiserror::Error;

use crate::config::RedisSettings;

#[derive(Debug, Error)]
pub enum RedisError {
    #[error("redis: {0}")]
    Redis(#[from] redis::RedisError),
}

/// Connection parameters for `settings`. Credentials are passed as-is, so
/// no URL escaping is involved; empty strings mean "not set".
pub fn connection_info(settings: &RedisSettings) -> ConnectionInfo {
    let non_empty = |value: &str| (!value.is_empty()).then(|| value.to_string());
    ConnectionInfo {
        addr: ConnectionAddr::Tcp(settings.host.clone(), settings.port),
        redis: RedisConnectionInfo {
            db: settings.db,
            username: non_empty(&settings.username),
            password: non_empty(&settings.password),
            ..Default::default()
        },
    }
}

/// Cheaply cloneable handle; clones share one multiplexed connection.
#[derive(Clone)]
pub struct RedisDriver {
    conn: ConnectionManager,
}

impl RedisDriver {
    pub async fn connect(settings: &RedisSettings) -> Result<Self, RedisError> {
        let client = redis::Client::open(connection_info(settings))?;
        let conn = ConnectionManager::new(client).await?;
        Ok(RedisDriver { conn })
    }

    /// Store `value` under `name`, expiring after `expire_secs` when given.
    pub async fn set(
        &self,
        name: &str,
        value: &str,
        expire_secs: Option<u64>,
    ) -> Result<(), RedisError> {
        let mut conn = self.conn.clone();
        match expire_secs {
            Some(secs) => conn.set_ex::<_, _, ()>(name, value, secs).await?,
            None => conn.set::<_, _, ()>(name, value).await?,
        }
        Ok(())
    }

    pub async fn get(&self, name: &str) -> Result<Option<String>, RedisError> {
        let mut conn = self.conn.clone();
        Ok(conn.get(name).await?)
    }

    pub async fn delete(&self, name: &str) -> Result<(), RedisError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(name).await?;
        Ok(())
    }

    pub async fn ping(&self) -> Result<(), RedisError> {
        let mut conn = self.conn.clone();
        redis::cmd("PING").query_async::<_, String>(&mut conn).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(username: &str, password: &str) -> RedisSettings {
        RedisSettings {
            host: "cache".to_string(),
            port: 6379,
            username: username.to_string(),
            password: password.to_string(),
            db: 2,
        }
    }

    #[test]
    fn test_connection_info_without_credentials() {
        let info = connection_info(&settings("", ""));
        assert!(matches!(&info.addr, ConnectionAddr::Tcp(host, 6379) if host == "cache"));
        assert_eq!(info.redis.db, 2);
        assert_eq!(info.redis.username, None);
        assert_eq!(info.redis.password, None);
    }

    #[test]
    fn test_connection_info_keeps_reserved_characters_in_password() {
        let info = connection_info(&settings("heart", "p/ss#1"));
        assert_eq!(info.redis.username.as_deref(), Some("heart"));
        assert_eq!(info.redis.password.as_deref(), Some("p/ss#1"));

        let client = redis::Client::open(info).unwrap();
        assert_eq!(client.get_connection_info().redis.password.as_deref(), Some("p/ss#1"));
    }

    #[test]
    fn test_connection_info_password_only() {
        let info = connection_info(&settings("", "pw"));
        assert_eq!(info.redis.username, None);
        assert_eq!(info.redis.password.as_deref(), Some("pw"));
    }

    #[tokio::test]
    #[ignore = "requires redis"]
    async fn test_set_get_delete() {
        let host = std::env::var("REDIS__HOST").unwrap_or_else(|_| "localhost".to_string());
        let driver = RedisDriver::connect(&RedisSettings {
            host,
            db: 0,
            ..settings("", "")
        })
        .await
        .unwrap();

        driver.ping().await.unwrap();
        driver.set("heart:test", "v", Some(30)).await.unwrap();
        assert_eq!(driver.get("heart:test").await.unwrap().as_deref(), Some("v"));
        driver.delete("heart:test").await.unwrap();
        assert_eq!(driver.get("heart:test").await.unwrap(), None);
    }
}
