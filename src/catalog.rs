use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::warn;

/// One remote version of a project: provider version id plus the human
/// version number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRef {
    pub id: String,
    pub version_number: String,
}

/// Provider-normalized project metadata, the engine's only view of a remote
/// catalog entry. Immutable within a page's lifetime; replaced wholesale on
/// re-query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRecord {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub categories: Vec<String>,
    pub client_side: Option<String>,
    pub server_side: Option<String>,
    #[serde(default)]
    pub versions: Vec<VersionRef>,
    pub latest_version: Option<String>,
}

/// The two Modrinth serializations found in the wild. Search hits carry
/// `project_id` and bare version-id strings; the project endpoint carries
/// `id` and structured version objects. Both collapse to [`CatalogRecord`]
/// here, at the ingestion boundary, so business logic never shape-checks.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawCatalogRecord {
    Project(ProjectShape),
    SearchHit(SearchHitShape),
}

#[derive(Debug, Deserialize)]
pub struct ProjectShape {
    pub id: String,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub categories: Vec<String>,
    pub client_side: Option<String>,
    pub server_side: Option<String>,
    #[serde(default)]
    pub versions: Vec<VersionRef>,
    pub latest_version: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchHitShape {
    pub project_id: String,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub categories: Vec<String>,
    pub client_side: Option<String>,
    pub server_side: Option<String>,
    #[serde(default)]
    pub versions: Vec<String>,
    pub latest_version: Option<String>,
}

impl From<RawCatalogRecord> for CatalogRecord {
    fn from(raw: RawCatalogRecord) -> Self {
        match raw {
            RawCatalogRecord::Project(project) => CatalogRecord {
                id: project.id,
                slug: project.slug,
                title: project.title,
                author: project.author,
                categories: project.categories,
                client_side: project.client_side,
                server_side: project.server_side,
                versions: project.versions,
                latest_version: project.latest_version,
            },
            RawCatalogRecord::SearchHit(hit) => CatalogRecord {
                id: hit.project_id,
                slug: hit.slug,
                title: hit.title,
                author: hit.author,
                categories: hit.categories,
                client_side: hit.client_side,
                server_side: hit.server_side,
                // The legacy shape carries version ids only; the human
                // version number arrives later from the version listing.
                versions: hit
                    .versions
                    .into_iter()
                    .map(|id| VersionRef {
                        version_number: id.clone(),
                        id,
                    })
                    .collect(),
                latest_version: hit.latest_version,
            },
        }
    }
}

/// Decode one page of raw hits, dropping entries that match neither known
/// shape. A malformed hit is a provider quirk, not a reason to lose the
/// page.
pub fn ingest_hits(hits: Vec<serde_json::Value>) -> Vec<CatalogRecord> {
    hits.into_iter()
        .filter_map(|hit| match serde_json::from_value::<RawCatalogRecord>(hit) {
            Ok(raw) => Some(CatalogRecord::from(raw)),
            Err(err) => {
                warn!("dropping unrecognized catalog hit: {err}");
                None
            }
        })
        .collect()
}

#[derive(Debug, Clone)]
struct CacheEntry<T> {
    value: T,
    stored_at: Instant,
}

/// In-memory TTL cache for catalog pages, keyed by the rendered query.
/// Staleness is checked on read; `purge_stale` exists for periodic cleanup.
#[derive(Debug, Clone)]
pub struct PageCache<T> {
    entries: HashMap<String, CacheEntry<T>>,
    ttl: Duration,
}

impl<T> PageCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
        }
    }

    /// Fresh entry for `key`, or `None` when absent or stale.
    pub fn get(&self, key: &str) -> Option<&T> {
        let entry = self.entries.get(key)?;
        if entry.stored_at.elapsed() > self.ttl {
            return None;
        }
        Some(&entry.value)
    }

    pub fn insert(&mut self, key: String, value: T) {
        self.entries.insert(
            key,
            CacheEntry {
                value,
                stored_at: Instant::now(),
            },
        );
    }

    pub fn is_stale(&self, key: &str) -> bool {
        match self.entries.get(key) {
            Some(entry) => entry.stored_at.elapsed() > self.ttl,
            None => true,
        }
    }

    pub fn purge_stale(&mut self) {
        let ttl = self.ttl;
        self.entries
            .retain(|_, entry| entry.stored_at.elapsed() <= ttl);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
