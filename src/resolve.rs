use crate::catalog::CatalogRecord;
use crate::inventory::{strip_archive_ext, LocalIndex, LocalModRecord};
use tracing::debug;

pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.7;

/// Normalized strings shorter than this are too unreliable to score.
const MIN_FUZZY_LEN: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStrategy {
    ExactTitle,
    ExactId,
    ExactSlug,
    FuzzyTitle,
    FuzzySlug,
}

impl MatchStrategy {
    pub fn is_exact(self) -> bool {
        matches!(
            self,
            MatchStrategy::ExactTitle | MatchStrategy::ExactId | MatchStrategy::ExactSlug
        )
    }
}

/// A correlation between one catalog record and one installed file. Derived,
/// never persisted; recomputed whenever either side changes.
#[derive(Debug, Clone)]
pub struct MatchResult {
    pub local: LocalModRecord,
    pub strategy: MatchStrategy,
    pub confidence: f64,
}

/// Match a catalog record against the local index. Tiered and
/// short-circuiting: exact title, exact id, exact slug, fuzzy title, fuzzy
/// slug. A fuzzy result always carries `confidence >= threshold`; below the
/// threshold the outcome is "no match", never a low-confidence guess.
///
/// Pure and total: no I/O, and both match and no-match are valid outcomes.
pub fn resolve(
    record: &CatalogRecord,
    index: &LocalIndex,
    threshold: f64,
) -> Option<MatchResult> {
    for (key, strategy) in [
        (record.title.as_str(), MatchStrategy::ExactTitle),
        (record.id.as_str(), MatchStrategy::ExactId),
        (record.slug.as_str(), MatchStrategy::ExactSlug),
    ] {
        if key.is_empty() {
            continue;
        }
        if let Some(local) = index.get(key) {
            return Some(MatchResult {
                local: local.clone(),
                strategy,
                confidence: 1.0,
            });
        }
    }

    if let Some((local, confidence)) = fuzzy_lookup(&record.title, index, threshold) {
        debug!(
            "fuzzy title match for {:?}: {} ({confidence:.2})",
            record.title, local.file_name
        );
        return Some(MatchResult {
            local,
            strategy: MatchStrategy::FuzzyTitle,
            confidence,
        });
    }
    if !record.slug.is_empty() {
        if let Some((local, confidence)) = fuzzy_lookup(&record.slug, index, threshold) {
            debug!(
                "fuzzy slug match for {:?}: {} ({confidence:.2})",
                record.slug, local.file_name
            );
            return Some(MatchResult {
                local,
                strategy: MatchStrategy::FuzzySlug,
                confidence,
            });
        }
    }

    None
}

fn fuzzy_lookup(
    target: &str,
    index: &LocalIndex,
    threshold: f64,
) -> Option<(LocalModRecord, f64)> {
    let target = fuzzy_key(target);
    if target.chars().count() < MIN_FUZZY_LEN {
        return None;
    }

    let mut best: Option<(&LocalModRecord, f64)> = None;
    for (key, record) in index.iter() {
        let candidate = fuzzy_key(key);
        if candidate.chars().count() < MIN_FUZZY_LEN {
            continue;
        }
        let score = similarity(&target, &candidate);
        if score < threshold {
            continue;
        }
        // Strictly greater, so ties keep the first candidate in
        // index-iteration order.
        if best.map(|(_, held)| score > held).unwrap_or(true) {
            best = Some((record, score));
        }
    }
    best.map(|(record, score)| (record.clone(), score))
}

/// Lower-case, strip the archive extension, collapse `-`/`_` and whitespace
/// runs into single spaces, trim. Idempotent.
pub fn normalize(raw: &str) -> String {
    let lower = raw.to_lowercase();
    let spaced: String = strip_archive_ext(&lower)
        .chars()
        .map(|c| if c == '-' || c == '_' { ' ' } else { c })
        .collect();
    spaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalized form with trailing loader and version tokens dropped, so
/// `sodium-fabric-1.20.jar` scores against `Sodium` as `sodium`, not as the
/// whole decorated file name. At least one token always survives.
fn fuzzy_key(raw: &str) -> String {
    let normalized = normalize(raw);
    let mut tokens: Vec<&str> = normalized.split(' ').filter(|t| !t.is_empty()).collect();
    while tokens.len() > 1 && is_noise_token(tokens[tokens.len() - 1]) {
        tokens.pop();
    }
    tokens.join(" ")
}

fn is_noise_token(token: &str) -> bool {
    const LOADERS: [&str; 5] = ["fabric", "forge", "neoforge", "quilt", "mc"];
    if LOADERS.contains(&token) {
        return true;
    }
    let mut chars = token.chars();
    match chars.next() {
        Some(first) if first.is_ascii_digit() => true,
        Some('v') => chars.next().map(|c| c.is_ascii_digit()).unwrap_or(false),
        _ => false,
    }
}

/// `1 - edit_distance / max(len)` over characters of two already-normalized
/// strings.
pub fn similarity(a: &str, b: &str) -> f64 {
    let len_a = a.chars().count();
    let len_b = b.chars().count();
    let longest = len_a.max(len_b);
    if longest == 0 {
        return 1.0;
    }
    1.0 - edit_distance(a, b) as f64 / longest as f64
}

/// Unit-cost insert/delete/substitute edit distance, two-row DP.
fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0usize; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitute = prev[j] + usize::from(ca != cb);
            current[j + 1] = substitute.min(prev[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut prev, &mut current);
    }
    prev[b.len()]
}
