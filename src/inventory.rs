use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fs::File,
    io::Read,
    path::{Path, PathBuf},
};
use tracing::warn;
use walkdir::WalkDir;
use zip::ZipArchive;

/// One installed mod file, as found on disk. `file_name` is unique within
/// an install context; the embedded metadata is best-effort and often
/// missing or inconsistent with the remote listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalModRecord {
    pub file_name: String,
    pub mod_name: Option<String>,
    pub mod_version: Option<String>,
    pub loader: Option<String>,
    /// Found in the installation's `disabled/` subfolder.
    pub disabled: bool,
}

/// One launcher installation: its mods directory plus the launcher version
/// id, e.g. `fabric-loader-0.16.10-1.21.4`, from which loader and game
/// version are derived for compatibility filtering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallContext {
    pub id: String,
    pub version_id: String,
    pub mods_dir: PathBuf,
}

impl InstallContext {
    pub fn loader(&self) -> Option<&'static str> {
        let version = self.version_id.to_lowercase();
        if version.contains("fabric") {
            Some("fabric")
        } else if version.contains("neoforge") {
            Some("neoforge")
        } else if version.contains("forge") {
            Some("forge")
        } else if version.contains("quilt") {
            Some("quilt")
        } else {
            None
        }
    }

    /// First `X.Y[.Z]` run that looks like a Minecraft version. Returns
    /// `None` rather than guessing when nothing plausible appears.
    pub fn game_version(&self) -> Option<String> {
        let pattern = regex::Regex::new(r"\b(\d+\.\d+(?:\.\d+)?)\b").ok()?;
        for captures in pattern.captures_iter(&self.version_id) {
            if let Some(found) = captures.get(1) {
                if found.as_str().starts_with("1.") {
                    return Some(found.as_str().to_string());
                }
            }
        }
        None
    }
}

/// Drop a trailing archive extension, preserving the rest of the name.
pub fn strip_archive_ext(name: &str) -> &str {
    for ext in [".jar", ".zip"] {
        if name.len() > ext.len() {
            let cut = name.len() - ext.len();
            if name.is_char_boundary(cut) && name[cut..].eq_ignore_ascii_case(ext) {
                return &name[..cut];
            }
        }
    }
    name
}

/// Case-insensitive lookup from candidate key to installed record, built
/// once per install context and rebuilt wholesale whenever the context or
/// the underlying mod list changes. Never patched in place.
///
/// Keys per record: the mod name (when present), the file name, and the
/// file name with its archive extension stripped. On collision the later
/// record in scan order wins.
#[derive(Debug, Clone, Default)]
pub struct LocalIndex {
    keys: Vec<String>,
    map: HashMap<String, LocalModRecord>,
}

impl LocalIndex {
    pub fn build(records: &[LocalModRecord]) -> Self {
        let mut index = Self::default();
        for record in records {
            if let Some(name) = &record.mod_name {
                index.insert(name, record);
            }
            index.insert(&record.file_name, record);
            index.insert(strip_archive_ext(&record.file_name), record);
        }
        index
    }

    fn insert(&mut self, key: &str, record: &LocalModRecord) {
        let key = key.trim().to_lowercase();
        if key.is_empty() {
            return;
        }
        if self.map.insert(key.clone(), record.clone()).is_none() {
            self.keys.push(key);
        }
    }

    pub fn get(&self, key: &str) -> Option<&LocalModRecord> {
        self.map.get(&key.trim().to_lowercase())
    }

    /// Keys in first-insertion order, so fuzzy-match tie-breaking is
    /// deterministic.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &LocalModRecord)> {
        self.keys
            .iter()
            .filter_map(|key| self.map.get(key).map(|record| (key.as_str(), record)))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Scan an installation's mods directory for `.jar` archives, including the
/// `disabled/` subfolder. Embedded loader metadata fills in mod name and
/// version when readable; an unreadable archive degrades to a bare
/// file-name record rather than failing the scan. A missing mods directory
/// is an empty installation, not an error.
pub fn scan_installed_mods(context: &InstallContext) -> Result<Vec<LocalModRecord>> {
    if !context.mods_dir.exists() {
        return Ok(Vec::new());
    }

    let mut records = Vec::new();
    for entry in WalkDir::new(&context.mods_dir)
        .min_depth(1)
        .max_depth(2)
        .sort_by_file_name()
    {
        let entry = entry.with_context(|| format!("scan mods dir {:?}", context.mods_dir))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("jar"))
            != Some(true)
        {
            continue;
        }
        let disabled = path
            .parent()
            .and_then(Path::file_name)
            .map(|name| name == "disabled")
            .unwrap_or(false);
        if entry.depth() == 2 && !disabled {
            continue;
        }
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        let (mod_name, mod_version, loader) = match read_jar_metadata(path) {
            Ok(meta) => meta,
            Err(err) => {
                warn!("unreadable mod archive {file_name}: {err:#}");
                (None, None, None)
            }
        };
        records.push(LocalModRecord {
            file_name,
            mod_name,
            mod_version,
            loader,
            disabled,
        });
    }

    Ok(records)
}

type JarMetadata = (Option<String>, Option<String>, Option<String>);

/// Loader manifests tried in order: Fabric, Quilt, then the Forge TOML.
fn read_jar_metadata(path: &Path) -> Result<JarMetadata> {
    let file = File::open(path).with_context(|| format!("open mod archive {:?}", path))?;
    let mut archive =
        ZipArchive::new(file).with_context(|| format!("read mod archive {:?}", path))?;

    for (manifest, loader) in [("fabric.mod.json", "fabric"), ("quilt.mod.json", "quilt")] {
        if let Some(raw) = read_archive_entry(&mut archive, manifest) {
            if let Ok(json) = serde_json::from_str::<serde_json::Value>(&raw) {
                let name = json
                    .get("name")
                    .and_then(|value| value.as_str())
                    .map(str::to_string);
                let version = json
                    .get("version")
                    .and_then(|value| value.as_str())
                    .map(str::to_string);
                if name.is_some() || version.is_some() {
                    return Ok((name, version, Some(loader.to_string())));
                }
            }
        }
    }

    if let Some(raw) = read_archive_entry(&mut archive, "META-INF/mods.toml") {
        if let Ok(parsed) = toml::from_str::<toml::Value>(&raw) {
            if let Some(first) = parsed
                .get("mods")
                .and_then(|value| value.as_array())
                .and_then(|mods| mods.first())
            {
                let name = first
                    .get("displayName")
                    .and_then(|value| value.as_str())
                    .map(str::to_string);
                let version = first
                    .get("version")
                    .and_then(|value| value.as_str())
                    .map(str::to_string);
                if name.is_some() || version.is_some() {
                    return Ok((name, version, Some("forge".to_string())));
                }
            }
        }
    }

    Ok((None, None, None))
}

fn read_archive_entry(archive: &mut ZipArchive<File>, name: &str) -> Option<String> {
    let mut entry = archive.by_name(name).ok()?;
    let mut raw = String::new();
    entry.read_to_string(&mut raw).ok()?;
    Some(raw)
}
