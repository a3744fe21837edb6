//! List-then-detail catalog client.
//!
//! [`DexClient::fetch_list`] calls the index endpoint once, then fans out one
//! detail request per entry with at most [`ClientConfig::concurrency`]
//! requests in flight. A failed detail fetch is logged and the entry dropped;
//! only a failed index call fails the whole operation. Results arrive in
//! completion order, so callers that need a stable order should sort them.
//!
//! Dropping the returned future abandons any detail requests still in flight.

use crate::cache::ResponseCache;
use crate::config::ClientConfig;
use crate::error::FetchResult;
use crate::model::{self, Entity, ListIndexEntry};
use crate::transport::{HttpTransport, Transport};
use foldhash::HashSet;
use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

/// State of one aggregate list fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPhase {
    Idle,
    FetchingIndex,
    FetchingDetails,
    Complete,
    Failed,
}

/// Snapshot reported to the progress callback of
/// [`DexClient::fetch_list_with_progress`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchProgress {
    pub phase: FetchPhase,
    /// Detail requests finished so far, successful or not.
    pub completed: usize,
    /// Detail requests that failed and were dropped.
    pub failed: usize,
    /// Detail requests to run; zero until the index has been fetched.
    pub total: usize,
}

impl FetchProgress {
    fn at(phase: FetchPhase) -> Self {
        Self {
            phase,
            completed: 0,
            failed: 0,
            total: 0,
        }
    }

    /// Fraction of detail requests completed, in `[0.0, 1.0]`.
    pub fn ratio(&self) -> f64 {
        match self.phase {
            FetchPhase::Complete => 1.0,
            _ if self.total == 0 => 0.0,
            _ => self.completed as f64 / self.total as f64,
        }
    }
}

/// Catalog API client. Construct one and pass it to whatever needs it.
#[derive(Debug)]
pub struct DexClient<T = HttpTransport> {
    transport: T,
    cache: ResponseCache,
    config: ClientConfig,
}

impl DexClient<HttpTransport> {
    /// Builds a client backed by the reqwest transport.
    pub fn new(config: ClientConfig) -> FetchResult<Self> {
        config.validate()?;
        let transport = HttpTransport::new(&config)?;
        Ok(Self::from_parts(transport, config))
    }
}

impl<T: Transport> DexClient<T> {
    /// Builds a client over any transport.
    pub fn with_transport(transport: T, config: ClientConfig) -> FetchResult<Self> {
        config.validate()?;
        Ok(Self::from_parts(transport, config))
    }

    fn from_parts(transport: T, config: ClientConfig) -> Self {
        Self {
            transport,
            cache: ResponseCache::new(config.cache),
            config,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Fetches the index page. Index payloads are never cached.
    pub async fn fetch_index(&self, limit: usize) -> FetchResult<Vec<ListIndexEntry>> {
        let url = self.config.index_url(limit);
        let body = self.transport.get(&url).await?;
        Ok(model::decode_index(&body)?)
    }

    /// Fetches and decodes one detail payload, serving it from the cache when present.
    pub async fn fetch_detail(&self, url: &str) -> FetchResult<Entity> {
        if let Some(payload) = self.cache.get(url) {
            debug!(url, "cache hit");
            return Ok(model::decode_entity(&payload)?);
        }
        debug!(url, "cache miss");
        self.fetch_detail_uncached(url).await
    }

    /// Fetches a detail payload from the transport, replacing any cache entry on success.
    pub async fn fetch_detail_uncached(&self, url: &str) -> FetchResult<Entity> {
        let body = self.transport.get(url).await?;
        let entity = model::decode_entity(&body)?;
        self.cache.insert(url, body);
        Ok(entity)
    }

    pub async fn fetch_list(&self, limit: usize) -> FetchResult<Vec<Entity>> {
        self.fetch_list_with_progress(limit, |_| {}).await
    }

    pub async fn fetch_list_with_progress<F>(
        &self,
        limit: usize,
        mut on_progress: F,
    ) -> FetchResult<Vec<Entity>>
    where
        F: FnMut(FetchProgress),
    {
        on_progress(FetchProgress::at(FetchPhase::Idle));
        info!(limit, "fetching catalog index");
        on_progress(FetchProgress::at(FetchPhase::FetchingIndex));

        let entries = match self.fetch_index(limit).await {
            Ok(entries) => dedup_by_url(entries),
            Err(err) => {
                warn!(error = %err, "index fetch failed");
                on_progress(FetchProgress::at(FetchPhase::Failed));
                return Err(err);
            }
        };

        let mut progress = FetchProgress {
            phase: FetchPhase::FetchingDetails,
            completed: 0,
            failed: 0,
            total: entries.len(),
        };
        on_progress(progress);

        let width = self.config.concurrency.unwrap_or(entries.len()).max(1);
        let mut pending = stream::iter(entries)
            .map(|entry| async move {
                let result = self.fetch_detail(&entry.url).await;
                (entry, result)
            })
            .buffer_unordered(width);

        let mut entities = Vec::with_capacity(progress.total);
        while let Some((entry, result)) = pending.next().await {
            progress.completed += 1;
            match result {
                Ok(entity) => entities.push(entity.with_detail_url(entry.url)),
                Err(err) => {
                    progress.failed += 1;
                    warn!(
                        name = %entry.name,
                        url = %entry.url,
                        error = %err,
                        "dropping entity after failed detail fetch"
                    );
                }
            }
            on_progress(progress);
        }

        info!(
            fetched = entities.len(),
            dropped = progress.failed,
            "catalog fetch complete"
        );
        progress.phase = FetchPhase::Complete;
        on_progress(progress);
        Ok(entities)
    }

    /// Re-fetches, bypassing the cache, every entity that has no image but
    /// remembers its detail URL. Successful fetches replace the entity in
    /// place; failures leave it untouched. Returns the number replaced.
    pub async fn refresh_missing_images(&self, entities: &mut [Entity]) -> usize {
        let mut replaced = 0;
        for entity in entities.iter_mut() {
            if entity.image_url().is_some() {
                continue;
            }
            let Some(url) = entity.detail_url().map(str::to_string) else {
                continue;
            };
            match self.fetch_detail_uncached(&url).await {
                Ok(fresh) => {
                    *entity = fresh.with_detail_url(url);
                    replaced += 1;
                }
                Err(err) => {
                    warn!(name = entity.name(), url = %url, error = %err, "image refresh failed");
                }
            }
        }
        replaced
    }
}

/// Keeps the first entry for each distinct URL, preserving index order.
fn dedup_by_url(entries: Vec<ListIndexEntry>) -> Vec<ListIndexEntry> {
    let mut seen = HashSet::default();
    entries
        .into_iter()
        .filter(|entry| seen.insert(entry.url.clone()))
        .collect()
}
