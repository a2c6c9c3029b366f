use std::collections::HashMap;
use std::time::{Duration, Instant};

use prost::Message;
use reqwest::Client;
use tracing::{debug, warn};

use crate::mta::realtime::FeedMessage;
use crate::mta::snapshot::FeedSnapshot;

/// Cache TTL: a cached snapshot older than this is not served.
const CACHE_TTL_SECONDS: u64 = 300;

/// Minimum interval between logging the same error source.
const ERROR_LOG_INTERVAL_SECS: u64 = 300;

/// Cached feed data.
struct FeedCacheEntry {
    snapshot: FeedSnapshot,
    fetched_at: Instant,
}

/// Backoff tracking for a feed.
struct BackoffState {
    failures: u32,
    retry_after: Instant,
}

/// MTA GTFS-RT client with connection pooling, caching, and exponential backoff.
///
/// Never panics. Fetch errors are logged and the last good snapshot for the
/// feed is returned while it is still fresh.
pub struct MtaClient {
    http: Client,
    feed_cache: HashMap<String, FeedCacheEntry>,
    backoff: HashMap<String, BackoffState>,
    last_error_log: HashMap<String, Instant>,
}

impl MtaClient {
    pub fn new() -> Result<Self, FetchError> {
        let http = Client::builder()
            .user_agent("NYC-SubwayArrivals-Rust/1.0")
            .gzip(true)
            .pool_max_idle_per_host(4)
            .timeout(Duration::from_secs(12))
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(MtaClient {
            http,
            feed_cache: HashMap::new(),
            backoff: HashMap::new(),
            last_error_log: HashMap::new(),
        })
    }

    /// Fetch and decode one feed, falling back to the cached snapshot.
    ///
    /// Returns `None` only when the fetch failed (or was skipped during
    /// backoff) and no fresh cached snapshot exists.
    pub async fn fetch_snapshot(&mut self, url: &str) -> Option<FeedSnapshot> {
        self.cleanup_feed_cache();

        if !self.should_fetch(url) {
            debug!("Feed {} in backoff, serving cache", url);
            return self.cached(url);
        }

        match fetch_single_feed(&self.http, url).await {
            Ok(feed) => {
                self.record_success(url);
                let snapshot = FeedSnapshot::from_feed(&feed);
                debug!(
                    "Feed {} returned {} trip updates",
                    url,
                    snapshot.trip_updates().len()
                );
                self.feed_cache.insert(
                    url.to_string(),
                    FeedCacheEntry {
                        snapshot: snapshot.clone(),
                        fetched_at: Instant::now(),
                    },
                );
                Some(snapshot)
            }
            Err(e) => {
                self.log_error(&format!("feed_{}", url), &format!("Error fetching {}: {}", url, e));
                self.record_failure(url);
                self.cached(url)
            }
        }
    }

    fn cached(&self, url: &str) -> Option<FeedSnapshot> {
        self.feed_cache
            .get(url)
            .filter(|entry| entry.fetched_at.elapsed().as_secs() < CACHE_TTL_SECONDS)
            .map(|entry| entry.snapshot.clone())
    }

    fn should_fetch(&self, feed_id: &str) -> bool {
        match self.backoff.get(feed_id) {
            Some(state) => Instant::now() >= state.retry_after,
            None => true,
        }
    }

    fn record_success(&mut self, feed_id: &str) {
        self.backoff.remove(feed_id);
    }

    fn record_failure(&mut self, feed_id: &str) {
        let failures = self
            .backoff
            .get(feed_id)
            .map(|s| s.failures + 1)
            .unwrap_or(1);
        // Exponential backoff: 15s, 30s, 60s, 120s, 240s, max 300s
        let backoff_secs = (15 * (1u64 << (failures - 1).min(5))).min(300);
        self.backoff.insert(
            feed_id.to_string(),
            BackoffState {
                failures,
                retry_after: Instant::now() + Duration::from_secs(backoff_secs),
            },
        );
    }

    fn log_error(&mut self, source: &str, msg: &str) {
        let now = Instant::now();
        let should_log = match self.last_error_log.get(source) {
            Some(last) => last.elapsed().as_secs() >= ERROR_LOG_INTERVAL_SECS,
            None => true,
        };
        if should_log {
            warn!("[MTA] {}", msg);
            self.last_error_log.insert(source.to_string(), now);
        }
    }

    fn cleanup_feed_cache(&mut self) {
        self.feed_cache
            .retain(|_, entry| entry.fetched_at.elapsed().as_secs() < CACHE_TTL_SECONDS);
    }
}

/// Fetch and decode a single GTFS-RT feed.
async fn fetch_single_feed(http: &Client, url: &str) -> Result<FeedMessage, FetchError> {
    let response = http
        .get(url)
        .send()
        .await
        .map_err(|e| FetchError::Http(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status(status.as_u16()));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| FetchError::Read(e.to_string()))?;

    FeedMessage::decode(bytes.as_ref()).map_err(|e| FetchError::Decode(e.to_string()))
}

/// Feed fetch errors.
#[derive(Debug)]
pub enum FetchError {
    Client(String),
    Http(String),
    Status(u16),
    Read(String),
    Decode(String),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::Client(msg) => write!(f, "failed to create HTTP client: {}", msg),
            FetchError::Http(msg) => write!(f, "HTTP error: {}", msg),
            FetchError::Status(code) => write!(f, "HTTP status {}", code),
            FetchError::Read(msg) => write!(f, "Read error: {}", msg),
            FetchError::Decode(msg) => write!(f, "Protobuf decode error: {}", msg),
        }
    }
}

impl std::error::Error for FetchError {}
