//! Load-time reconciliation.
//!
//! Chooses a data source for the session aggregate (remote store, then
//! local cache, then seed dataset) and merges seed entries into whatever
//! base was chosen. Never fails: the seed guarantees a usable, non-empty
//! aggregate regardless of remote and cache availability.

use crate::cache::CacheStore;
use crate::models::{AppData, Connectivity};
use crate::remote::RemoteClient;
use crate::seed;

/// Result of a reconciled load.
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub data: AppData,
    pub connectivity: Connectivity,
}

/// The reconciler owns no state of its own; it borrows the remote client
/// and cache store and produces a fresh aggregate per call.
pub struct Reconciler<'a> {
    remote: &'a RemoteClient,
    cache: &'a CacheStore,
}

impl<'a> Reconciler<'a> {
    pub fn new(remote: &'a RemoteClient, cache: &'a CacheStore) -> Self {
        Self { remote, cache }
    }

    /// Load the aggregate.
    ///
    /// Remote success with a structurally valid payload adopts the remote
    /// aggregate and marks the session connected. Any failure (transport,
    /// non-2xx, malformed payload) downgrades to the cached snapshot, and
    /// an absent or unreadable cache downgrades further to the seed
    /// dataset. Seed entries absent from the chosen base are then merged in
    /// by identifier; existing entries are never replaced.
    pub async fn load(&self) -> LoadOutcome {
        let (mut data, connectivity) = match self.remote.fetch_directory().await {
            Ok(data) => {
                tracing::info!(
                    departments = data.departments.len(),
                    professors = data.professors.len(),
                    "Loaded directory from remote store"
                );
                (data, Connectivity::Connected)
            }
            Err(e) => {
                tracing::warn!("Remote load failed, falling back: {}", e);
                match self.cache.load().await {
                    Some(cached) => {
                        tracing::info!(
                            professors = cached.professors.len(),
                            "Using cached directory snapshot"
                        );
                        (cached, Connectivity::Offline)
                    }
                    None => {
                        tracing::info!("No usable cache, using bundled seed dataset");
                        (seed::dataset().clone(), Connectivity::Offline)
                    }
                }
            }
        };

        data.merge_missing(seed::dataset());

        LoadOutcome { data, connectivity }
    }
}
