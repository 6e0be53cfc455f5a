use crate::catalog::{CatalogRecord, VersionRef};
use crate::filter::TranslatedQuery;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Remote catalog providers the launcher knows about.
///
/// Only Modrinth has a defined query format today; passing any other
/// provider to the translator is an input error, not a silent fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    Modrinth,
    CurseForge,
}

impl Provider {
    pub fn as_str(self) -> &'static str {
        match self {
            Provider::Modrinth => "modrinth",
            Provider::CurseForge => "curseforge",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort order for catalog search results. Carried on the filter state and
/// passed through to the provider untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortIndex {
    Relevance,
    Downloads,
    Follows,
    Newest,
    Updated,
}

impl SortIndex {
    pub fn as_str(self) -> &'static str {
        match self {
            SortIndex::Relevance => "relevance",
            SortIndex::Downloads => "downloads",
            SortIndex::Follows => "follows",
            SortIndex::Newest => "newest",
            SortIndex::Updated => "updated",
        }
    }
}

/// Remote catalog search. `query == None` means an unfiltered listing in
/// the provider's default order; otherwise the query carries the sort.
pub trait CatalogSearch {
    fn search(
        &mut self,
        query: Option<&TranslatedQuery>,
        provider: Provider,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<CatalogRecord>>;
}

/// Remote version listing for one project, already narrowed to the loader
/// and game version of the active installation when filters are given.
pub trait VersionListing {
    fn list_versions(
        &mut self,
        provider: Provider,
        project_id: &str,
        loader: Option<&str>,
        game_version: Option<&str>,
    ) -> Result<Vec<VersionRef>>;
}

/// One install the engine has decided to request. The engine never performs
/// the transfer itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallRequest<'a> {
    pub provider: Provider,
    pub project_id: &'a str,
    pub version_id: &'a str,
}

/// Side-effecting install/download collaborator.
pub trait ModInstaller {
    fn install(&mut self, request: &InstallRequest<'_>) -> Result<()>;
}
