//! URL-keyed page cache shared by all concurrently running tasks.
//!
//! A page fetched once is trusted for the lifetime of the store: entries are
//! immutable and never evicted. Cold fetches are serialized behind a single
//! gate so at most one request is in flight system-wide, with a small
//! randomized delay before the gate is released to rate-limit the origin.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use rand::Rng;
use sqlx::SqlitePool;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::FetchError;

/// Browser identities rotated across cache misses.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Safari/605.1.15",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:120.0) Gecko/20100101 Firefox/120.0",
];

const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

/// Trait for the raw page transport (to allow mocking)
#[async_trait]
pub trait PageTransport: Send + Sync {
    async fn get(&self, url: &str, user_agent: &str) -> Result<Vec<u8>, FetchError>;
}

/// Production transport over reqwest.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageTransport for HttpTransport {
    async fn get(&self, url: &str, user_agent: &str) -> Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, user_agent)
            .header(reqwest::header::ACCEPT_LANGUAGE, ACCEPT_LANGUAGE)
            .send()
            .await
            .map_err(|source| FetchError::Network {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| FetchError::Network {
                url: url.to_string(),
                source,
            })?;

        Ok(body.to_vec())
    }
}

/// Content-addressed (by URL) store of raw page bytes.
pub struct FetchCache {
    pool: SqlitePool,
    transport: Arc<dyn PageTransport>,
    // Serializes check-fetch-insert across all URLs; cache hits bypass it.
    gate: Mutex<()>,
}

impl FetchCache {
    pub fn new(pool: SqlitePool, transport: Arc<dyn PageTransport>) -> Self {
        Self {
            pool,
            transport,
            gate: Mutex::new(()),
        }
    }

    /// Create the backing table if it does not exist yet.
    pub async fn ensure_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS webpages (
                url TEXT PRIMARY KEY,
                content BLOB NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Return the page at `url`, fetching and caching it on first access.
    ///
    /// Never returns partial content: the body is stored whole or not at all.
    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        if let Some(content) = self.lookup(url).await? {
            return Ok(content);
        }

        let _guard = self.gate.lock().await;

        // Another task may have filled the entry while we waited on the gate.
        if let Some(content) = self.lookup(url).await? {
            return Ok(content);
        }

        let user_agent = USER_AGENTS[rand::thread_rng().gen_range(0..USER_AGENTS.len())];
        debug!(url = %url, "Cache miss, fetching");

        let content = self.transport.get(url, user_agent).await?;

        sqlx::query("INSERT OR IGNORE INTO webpages (url, content) VALUES (?, ?)")
            .bind(url)
            .bind(&content)
            .execute(&self.pool)
            .await?;

        debug!(url = %url, bytes = content.len(), "Cached page");

        // Hold the gate through a short randomized pause to space out requests.
        let delay_ms = rand::thread_rng().gen_range(10..=80);
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;

        Ok(content)
    }

    async fn lookup(&self, url: &str) -> Result<Option<Vec<u8>>, FetchError> {
        let row: Option<(Vec<u8>,)> = sqlx::query_as("SELECT content FROM webpages WHERE url = ?")
            .bind(url)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|(content,)| content))
    }
}
