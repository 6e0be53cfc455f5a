use std::cmp::Ordering;

/// Compare two free-form version strings.
///
/// Splits on `.` and `-`, coerces every segment to an integer (non-numeric
/// segments count as 0) and compares segment-by-segment, padding the shorter
/// sequence with zeros. Total and deterministic for any input, so it can
/// double as a sort key.
///
/// Not a semver parser: providers ship free-form numbers like `0.5.8-beta`,
/// `1.21.4+fabric` or `rev-42`. Pre-release tags are zero-weighted, so
/// `1.2.0-beta` and `1.2.0` compare equal.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let a = segments(a);
    let b = segments(b);
    for i in 0..a.len().max(b.len()) {
        let x = a.get(i).copied().unwrap_or(0);
        let y = b.get(i).copied().unwrap_or(0);
        match x.cmp(&y) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

/// True when `candidate` compares strictly greater than `installed`.
pub fn is_newer(candidate: &str, installed: &str) -> bool {
    compare_versions(candidate, installed) == Ordering::Greater
}

fn segments(version: &str) -> Vec<u64> {
    version
        .split(['.', '-'])
        .map(|segment| segment.trim().parse::<u64>().unwrap_or(0))
        .collect()
}
