//! End-to-end pass over the engine: filter translation, catalog ingestion,
//! identity resolution, update detection and the batch update, with
//! in-memory collaborators standing in for the network.

use anyhow::{bail, Result};
use lodestone::{
    compute_update_status, ingest_hits, resolve, run_batch_update, translate, CatalogRecord,
    CatalogSearch, FilterEntry, FilterState, InstallContext, InstallRequest, LocalIndex,
    LocalModRecord, ModInstaller, PendingUpdate, Provider, SortIndex, TranslatedQuery, UpdateSet,
    VersionListing, VersionRef, DEFAULT_FUZZY_THRESHOLD,
};
use serde_json::json;
use std::path::PathBuf;

struct FakeCatalog {
    last_facets: Option<String>,
    last_sort: Option<SortIndex>,
}

impl CatalogSearch for FakeCatalog {
    fn search(
        &mut self,
        query: Option<&TranslatedQuery>,
        _provider: Provider,
        _limit: usize,
        _offset: usize,
    ) -> Result<Vec<CatalogRecord>> {
        self.last_sort = query.and_then(|query| query.sort);
        self.last_facets = query.and_then(TranslatedQuery::facet_string);
        Ok(ingest_hits(vec![
            json!({
                "project_id": "AANobbMI",
                "slug": "sodium",
                "title": "Sodium",
                "author": "jellysquid3",
                "categories": ["optimization"],
                "client_side": "required",
                "server_side": "unsupported",
            }),
            json!({
                "project_id": "gvQqBUqZ",
                "slug": "lithium",
                "title": "Lithium",
                "author": "jellysquid3",
            }),
            json!({
                "project_id": "YL57xq9U",
                "slug": "iris",
                "title": "Iris Shaders",
                "author": "coderbot",
            }),
        ]))
    }
}

struct FakeVersions;

impl VersionListing for FakeVersions {
    fn list_versions(
        &mut self,
        _provider: Provider,
        project_id: &str,
        loader: Option<&str>,
        game_version: Option<&str>,
    ) -> Result<Vec<VersionRef>> {
        assert_eq!(loader, Some("fabric"));
        assert_eq!(game_version, Some("1.21.4"));
        let versions = match project_id {
            "AANobbMI" => vec![
                VersionRef {
                    id: "sodium-053".to_string(),
                    version_number: "0.5.3".to_string(),
                },
                VersionRef {
                    id: "sodium-058".to_string(),
                    version_number: "0.5.8-beta".to_string(),
                },
            ],
            "gvQqBUqZ" => vec![VersionRef {
                id: "lithium-012".to_string(),
                version_number: "0.12.0".to_string(),
            }],
            _ => Vec::new(),
        };
        Ok(versions)
    }
}

struct CountingInstaller {
    fail_on: &'static str,
    installed: Vec<String>,
}

impl ModInstaller for CountingInstaller {
    fn install(&mut self, request: &InstallRequest<'_>) -> Result<()> {
        if request.project_id == self.fail_on {
            bail!("mirror unavailable");
        }
        self.installed.push(request.version_id.to_string());
        Ok(())
    }
}

#[test]
fn filters_resolve_and_update_end_to_end() {
    let context = InstallContext {
        id: "main".to_string(),
        version_id: "fabric-loader-0.16.10-1.21.4".to_string(),
        mods_dir: PathBuf::new(),
    };

    let state = FilterState {
        categories: vec![
            FilterEntry::include("Optimization"),
            FilterEntry::exclude("Library"),
        ],
        sort: Some(SortIndex::Downloads),
        ..FilterState::default()
    };
    let query = translate(&state, Provider::Modrinth).unwrap();
    assert!(query.is_some());

    let mut search = FakeCatalog {
        last_facets: None,
        last_sort: None,
    };
    let page = search
        .search(query.as_ref(), Provider::Modrinth, 20, 0)
        .unwrap();
    assert_eq!(page.len(), 3);
    assert_eq!(
        search.last_facets.as_deref(),
        Some(r#"[["categories:optimization"],["categories!=library"]]"#)
    );
    assert_eq!(search.last_sort, Some(SortIndex::Downloads));

    // Local files carry decorated names and patchy embedded metadata.
    let installed = vec![
        LocalModRecord {
            file_name: "sodium-fabric-1.20.jar".to_string(),
            mod_name: None,
            mod_version: Some("0.5.3".to_string()),
            loader: Some("fabric".to_string()),
            disabled: false,
        },
        LocalModRecord {
            file_name: "lithium-fabric-mc1.21.4-0.12.0.jar".to_string(),
            mod_name: Some("Lithium".to_string()),
            mod_version: Some("0.12.0".to_string()),
            loader: Some("fabric".to_string()),
            disabled: false,
        },
    ];
    let index = LocalIndex::build(&installed);

    let mut listing = FakeVersions;
    let mut update_set = UpdateSet::default();
    let mut statuses = Vec::new();
    for record in &page {
        let Some(matched) = resolve(record, &index, DEFAULT_FUZZY_THRESHOLD) else {
            continue;
        };
        let versions = listing
            .list_versions(
                Provider::Modrinth,
                &record.id,
                context.loader(),
                context.game_version().as_deref(),
            )
            .unwrap();
        let status = compute_update_status(
            &matched.local.file_name,
            matched.local.mod_version.as_deref(),
            &versions,
        );
        if status.has_update {
            update_set.insert(PendingUpdate {
                file_name: status.file_name.clone(),
                provider: Provider::Modrinth,
                project_id: record.id.clone(),
                version_id: status.latest_version_id.clone().unwrap(),
            });
        }
        statuses.push(status);
    }

    // Iris is not installed; Sodium has an update; Lithium is current.
    assert_eq!(statuses.len(), 2);
    let sodium = statuses
        .iter()
        .find(|status| status.file_name == "sodium-fabric-1.20.jar")
        .unwrap();
    assert!(sodium.has_update);
    assert_eq!(sodium.latest_version_number.as_deref(), Some("0.5.8-beta"));
    let lithium = statuses
        .iter()
        .find(|status| status.file_name.starts_with("lithium"))
        .unwrap();
    assert!(!lithium.has_update);
    assert_eq!(update_set.len(), 1);

    let mut installer = CountingInstaller {
        fail_on: "none",
        installed: Vec::new(),
    };
    let report = run_batch_update(&mut update_set, &mut installer);
    assert_eq!(report.success_count, 1);
    assert_eq!(report.fail_count, 0);
    assert_eq!(installer.installed, vec!["sodium-058"]);
    assert!(update_set.is_empty());
}
