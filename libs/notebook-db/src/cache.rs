use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error(transparent)]
    Redis(#[from] redis::RedisError),

    #[error("cache did not answer within {0:?}")]
    Timeout(Duration),

    #[error("unexpected PING reply: {0}")]
    UnexpectedReply(String),
}

/// Client handle for the key-value cache.
///
/// Constructing it does not open a connection; [`RedisCache::ping`] does.
#[derive(Clone, Debug)]
pub struct RedisCache {
    client: redis::Client,
    timeout: Duration,
}

impl RedisCache {
    pub fn open(url: &str) -> Result<Self, CacheError> {
        Ok(Self {
            client: redis::Client::open(url)?,
            timeout: Duration::from_secs(2),
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn ping(&self) -> Result<(), CacheError> {
        let probe = async {
            let mut conn = self.client.get_multiplexed_async_connection().await?;
            redis::cmd("PING").query_async::<_, String>(&mut conn).await
        };

        let reply = tokio::time::timeout(self.timeout, probe)
            .await
            .map_err(|_| CacheError::Timeout(self.timeout))??;

        if reply.eq_ignore_ascii_case("PONG") {
            Ok(())
        } else {
            Err(CacheError::UnexpectedReply(reply))
        }
    }
}
