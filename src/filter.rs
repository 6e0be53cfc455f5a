use crate::error::EngineError;
use crate::provider::{Provider, SortIndex};
use serde::{Deserialize, Serialize};

/// Whether a filter value narrows the search to it or rules it out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterMode {
    Include,
    Exclude,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterEntry {
    pub value: String,
    pub mode: FilterMode,
}

impl FilterEntry {
    pub fn include(value: &str) -> Self {
        Self {
            value: value.to_string(),
            mode: FilterMode::Include,
        }
    }

    pub fn exclude(value: &str) -> Self {
        Self {
            value: value.to_string(),
            mode: FilterMode::Exclude,
        }
    }
}

/// Per-session filter widget state. Rebuilt fresh each session, never
/// persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    pub query: String,
    pub categories: Vec<FilterEntry>,
    pub client_side: Vec<FilterEntry>,
    pub server_side: Vec<FilterEntry>,
    pub license: Vec<FilterEntry>,
    pub open_source_only: bool,
    pub sort: Option<SortIndex>,
}

impl FilterState {
    /// No active filters and no search text. Callers treat the translated
    /// `None` as "reset to unfiltered" and must also reset their pagination
    /// offset. A sort preference alone does not count: an unfiltered listing
    /// uses the provider's default order.
    pub fn is_empty(&self) -> bool {
        self.query.trim().is_empty()
            && self.categories.is_empty()
            && self.client_side.is_empty()
            && self.server_side.is_empty()
            && self.license.is_empty()
            && !self.open_source_only
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClauseOp {
    Is,
    IsNot,
}

impl ClauseOp {
    pub fn as_str(self) -> &'static str {
        match self {
            ClauseOp::Is => ":",
            ClauseOp::IsNot => "!=",
        }
    }
}

/// One `dimension <op> value` condition, e.g. `categories:adventure`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Clause {
    pub dimension: &'static str,
    pub op: ClauseOp,
    pub value: String,
}

impl Clause {
    fn render(&self) -> String {
        format!("{}{}{}", self.dimension, self.op.as_str(), self.value)
    }
}

/// Provider-specific query shape: clause-groups AND'd together, clauses
/// within a group OR'd. Plus the free-text search string, which Modrinth
/// takes as a separate parameter rather than a facet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranslatedQuery {
    pub query: Option<String>,
    pub facets: Vec<Vec<Clause>>,
    pub sort: Option<SortIndex>,
}

impl TranslatedQuery {
    /// Modrinth facet syntax: a JSON array of arrays of `dim:value` strings,
    /// e.g. `[["categories:adventure","categories:magic"],["categories!=library"]]`.
    /// `None` when there are no facet clauses at all.
    pub fn facet_string(&self) -> Option<String> {
        if self.facets.is_empty() {
            return None;
        }
        let rendered: Vec<Vec<String>> = self
            .facets
            .iter()
            .map(|group| group.iter().map(Clause::render).collect())
            .collect();
        serde_json::to_string(&rendered).ok()
    }
}

/// Translate filter state into the provider's query shape.
///
/// `Ok(None)` iff the state is entirely empty; that sentinel is distinct
/// from an empty-but-present query. An unsupported provider is an input
/// error, never a silent fallback to another provider's shape.
pub fn translate(
    state: &FilterState,
    provider: Provider,
) -> Result<Option<TranslatedQuery>, EngineError> {
    match provider {
        Provider::Modrinth => {}
        other => return Err(EngineError::UnsupportedProvider(other)),
    }

    if state.is_empty() {
        return Ok(None);
    }

    let mut facets = Vec::new();
    push_dimension(&mut facets, "categories", &state.categories, false)?;
    // Environment dimensions are boolean-like: a simultaneous include and
    // exclude of the same value resolves to the exclude.
    push_dimension(&mut facets, "client_side", &state.client_side, true)?;
    push_dimension(&mut facets, "server_side", &state.server_side, true)?;
    push_dimension(&mut facets, "license", &state.license, false)?;
    if state.open_source_only {
        facets.push(vec![Clause {
            dimension: "open_source",
            op: ClauseOp::Is,
            value: "true".to_string(),
        }]);
    }

    let query = state.query.trim();
    let query = (!query.is_empty()).then(|| query.to_string());

    Ok(Some(TranslatedQuery {
        query,
        facets,
        sort: state.sort,
    }))
}

/// Includes of one dimension collapse into a single OR'd clause-group; each
/// exclude becomes its own clause-group, since exclusions must each
/// independently negate a value rather than be alternatives to one another.
fn push_dimension(
    facets: &mut Vec<Vec<Clause>>,
    dimension: &'static str,
    entries: &[FilterEntry],
    exclude_precedence: bool,
) -> Result<(), EngineError> {
    let mut includes = Vec::new();
    let mut excludes = Vec::new();

    for entry in entries {
        let value = entry.value.trim().to_lowercase();
        if value.is_empty() {
            return Err(EngineError::EmptyFilterValue { dimension });
        }
        match entry.mode {
            FilterMode::Include => includes.push(value),
            FilterMode::Exclude => excludes.push(value),
        }
    }

    if exclude_precedence {
        includes.retain(|value| !excludes.contains(value));
    }

    if !includes.is_empty() {
        facets.push(
            includes
                .into_iter()
                .map(|value| Clause {
                    dimension,
                    op: ClauseOp::Is,
                    value,
                })
                .collect(),
        );
    }
    for value in excludes {
        facets.push(vec![Clause {
            dimension,
            op: ClauseOp::IsNot,
            value,
        }]);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_state_translates_to_none() {
        let state = FilterState::default();
        assert_eq!(translate(&state, Provider::Modrinth).unwrap(), None);

        let blank_query = FilterState {
            query: "   ".to_string(),
            ..FilterState::default()
        };
        assert_eq!(translate(&blank_query, Provider::Modrinth).unwrap(), None);
    }

    #[test]
    fn query_text_alone_is_not_empty() {
        let state = FilterState {
            query: "sodium".to_string(),
            ..FilterState::default()
        };
        let translated = translate(&state, Provider::Modrinth).unwrap().unwrap();
        assert_eq!(translated.query.as_deref(), Some("sodium"));
        assert!(translated.facets.is_empty());
        assert_eq!(translated.facet_string(), None);
    }

    #[test]
    fn includes_group_and_excludes_stand_alone() {
        let state = FilterState {
            categories: vec![
                FilterEntry::include("Adventure"),
                FilterEntry::include("Magic"),
                FilterEntry::exclude("Library"),
            ],
            ..FilterState::default()
        };
        let translated = translate(&state, Provider::Modrinth).unwrap().unwrap();
        assert_eq!(translated.facets.len(), 2);
        assert_eq!(
            translated.facets[0]
                .iter()
                .map(|clause| (clause.op, clause.value.as_str()))
                .collect::<Vec<_>>(),
            vec![(ClauseOp::Is, "adventure"), (ClauseOp::Is, "magic")]
        );
        assert_eq!(
            translated.facets[1]
                .iter()
                .map(|clause| (clause.op, clause.value.as_str()))
                .collect::<Vec<_>>(),
            vec![(ClauseOp::IsNot, "library")]
        );
        assert_eq!(
            translated.facet_string().unwrap(),
            r#"[["categories:adventure","categories:magic"],["categories!=library"]]"#
        );
    }

    #[test]
    fn exclude_wins_on_boolean_dimensions() {
        let state = FilterState {
            client_side: vec![
                FilterEntry::include("required"),
                FilterEntry::exclude("required"),
            ],
            ..FilterState::default()
        };
        let translated = translate(&state, Provider::Modrinth).unwrap().unwrap();
        assert_eq!(translated.facets.len(), 1);
        assert_eq!(translated.facets[0][0].op, ClauseOp::IsNot);
        assert_eq!(translated.facets[0][0].value, "required");
    }

    #[test]
    fn contradiction_is_not_resolved_for_plain_dimensions() {
        let state = FilterState {
            categories: vec![
                FilterEntry::include("library"),
                FilterEntry::exclude("library"),
            ],
            ..FilterState::default()
        };
        let translated = translate(&state, Provider::Modrinth).unwrap().unwrap();
        assert_eq!(translated.facets.len(), 2);
    }

    #[test]
    fn open_source_flag_becomes_a_clause_group() {
        let state = FilterState {
            open_source_only: true,
            ..FilterState::default()
        };
        let translated = translate(&state, Provider::Modrinth).unwrap().unwrap();
        assert_eq!(
            translated.facet_string().unwrap(),
            r#"[["open_source:true"]]"#
        );
    }

    #[test]
    fn sort_rides_the_translated_query() {
        let state = FilterState {
            query: "sodium".to_string(),
            sort: Some(SortIndex::Downloads),
            ..FilterState::default()
        };
        let translated = translate(&state, Provider::Modrinth).unwrap().unwrap();
        assert_eq!(translated.sort, Some(SortIndex::Downloads));
    }

    #[test]
    fn sort_alone_is_still_empty() {
        let state = FilterState {
            sort: Some(SortIndex::Newest),
            ..FilterState::default()
        };
        assert!(state.is_empty());
        assert_eq!(translate(&state, Provider::Modrinth).unwrap(), None);
    }

    #[test]
    fn unsupported_provider_is_an_input_error() {
        let state = FilterState {
            query: "sodium".to_string(),
            ..FilterState::default()
        };
        assert_eq!(
            translate(&state, Provider::CurseForge),
            Err(EngineError::UnsupportedProvider(Provider::CurseForge))
        );
    }

    #[test]
    fn blank_filter_value_is_an_input_error() {
        let state = FilterState {
            license: vec![FilterEntry::include("  ")],
            ..FilterState::default()
        };
        assert_eq!(
            translate(&state, Provider::Modrinth),
            Err(EngineError::EmptyFilterValue {
                dimension: "license"
            })
        );
    }
}
