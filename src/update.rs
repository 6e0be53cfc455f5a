use crate::catalog::VersionRef;
use crate::provider::{InstallRequest, ModInstaller, Provider};
use crate::version::{compare_versions, is_newer};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashSet;
use tracing::warn;

/// Per-mod update verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateStatus {
    pub file_name: String,
    pub has_update: bool,
    /// Some compatible remote version differs from the installed one, newer
    /// or not.
    pub has_other_versions: bool,
    pub latest_version_id: Option<String>,
    pub latest_version_number: Option<String>,
}

/// Decide whether `compatible` holds anything newer than the installed
/// version. An unknown installed version never claims an update.
pub fn compute_update_status(
    file_name: &str,
    installed_version: Option<&str>,
    compatible: &[VersionRef],
) -> UpdateStatus {
    let mut status = UpdateStatus {
        file_name: file_name.to_string(),
        has_update: false,
        has_other_versions: false,
        latest_version_id: None,
        latest_version_number: None,
    };

    let Some(installed) = installed_version else {
        status.has_other_versions = !compatible.is_empty();
        return status;
    };

    let mut latest: Option<&VersionRef> = None;
    for version in compatible {
        if version.version_number != installed {
            status.has_other_versions = true;
        }
        if !is_newer(&version.version_number, installed) {
            continue;
        }
        let better = latest
            .map(|held| {
                compare_versions(&version.version_number, &held.version_number)
                    == Ordering::Greater
            })
            .unwrap_or(true);
        if better {
            latest = Some(version);
        }
    }

    if let Some(latest) = latest {
        status.has_update = true;
        status.latest_version_id = Some(latest.id.clone());
        status.latest_version_number = Some(latest.version_number.clone());
    }
    status
}

/// One mod queued for the batch update: which project version to request
/// and the local file it replaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUpdate {
    pub file_name: String,
    pub provider: Provider,
    pub project_id: String,
    pub version_id: String,
}

/// The live set of mods flagged `has_update`, keyed by file name and kept
/// in insertion order. Re-inserting a file name replaces its pending entry;
/// recomputation may have found a newer target version.
#[derive(Debug, Clone, Default)]
pub struct UpdateSet {
    entries: Vec<PendingUpdate>,
}

impl UpdateSet {
    pub fn insert(&mut self, pending: PendingUpdate) {
        self.entries
            .retain(|entry| entry.file_name != pending.file_name);
        self.entries.push(pending);
    }

    pub fn remove(&mut self, file_name: &str) {
        self.entries.retain(|entry| entry.file_name != file_name);
    }

    pub fn iter(&self) -> impl Iterator<Item = &PendingUpdate> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub success_count: usize,
    pub fail_count: usize,
}

/// Run every pending update sequentially, one install at a time. A failed
/// item is counted and logged; the batch always completes. Processed
/// entries are cleared from the set; failures are not retried.
pub fn run_batch_update(set: &mut UpdateSet, installer: &mut dyn ModInstaller) -> BatchReport {
    let pending = std::mem::take(&mut set.entries);
    let mut report = BatchReport::default();

    for item in pending {
        let request = InstallRequest {
            provider: item.provider,
            project_id: &item.project_id,
            version_id: &item.version_id,
        };
        match installer.install(&request) {
            Ok(()) => report.success_count += 1,
            Err(err) => {
                warn!("update failed for {}: {err:#}", item.file_name);
                report.fail_count += 1;
            }
        }
    }

    report
}

/// De-duplication guard for per-mod metadata lookups dispatched against the
/// catalog collaborator. Not a lock: it only prevents a second in-flight
/// request for the same file name. Cleared when the install context
/// changes, not on every recomputation.
#[derive(Debug, Clone, Default)]
pub struct FetchGuard {
    attempted: HashSet<String>,
}

impl FetchGuard {
    /// True when this is the first attempt for `file_name`; the caller may
    /// dispatch. Subsequent calls return false until `reset`.
    pub fn begin(&mut self, file_name: &str) -> bool {
        self.attempted.insert(file_name.to_string())
    }

    pub fn reset(&mut self) {
        self.attempted.clear();
    }
}
