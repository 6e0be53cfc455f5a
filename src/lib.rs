//! Mod reconciliation and update detection engine for Minecraft launchers.
//!
//! The launcher UI owns listing, pagination and settings; this crate owns
//! the decisions underneath: translating filter state into a provider
//! query, correlating remote catalog entries with installed files that
//! share no stable key, ordering heterogeneous version strings, and
//! driving a best-effort batch update. Remote search, version listing and
//! installation are collaborator traits; the engine itself performs no
//! network I/O.

pub mod catalog;
pub mod error;
pub mod filter;
pub mod inventory;
pub mod provider;
pub mod resolve;
pub mod update;
pub mod version;

pub use catalog::{ingest_hits, CatalogRecord, PageCache, VersionRef};
pub use error::EngineError;
pub use filter::{translate, FilterEntry, FilterMode, FilterState, TranslatedQuery};
pub use inventory::{scan_installed_mods, InstallContext, LocalIndex, LocalModRecord};
pub use provider::{
    CatalogSearch, InstallRequest, ModInstaller, Provider, SortIndex, VersionListing,
};
pub use resolve::{resolve, MatchResult, MatchStrategy, DEFAULT_FUZZY_THRESHOLD};
pub use update::{
    compute_update_status, run_batch_update, BatchReport, FetchGuard, PendingUpdate, UpdateSet,
    UpdateStatus,
};
pub use version::{compare_versions, is_newer};
