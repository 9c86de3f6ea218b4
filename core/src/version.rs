//! Dotted-version comparison for the update check.

/// Returns true when `remote` is strictly newer than `local`. Versions are
/// compared segment-by-segment as integers; missing or non-numeric segments
/// count as zero.
pub fn is_newer_version(remote: &str, local: &str) -> bool {
    let remote: Vec<u64> = parse_segments(remote);
    let local: Vec<u64> = parse_segments(local);
    let len = remote.len().max(local.len());
    for i in 0..len {
        let r = remote.get(i).copied().unwrap_or(0);
        let l = local.get(i).copied().unwrap_or(0);
        if r != l {
            return r > l;
        }
    }
    false
}

fn parse_segments(version: &str) -> Vec<u64> {
    version
        .split('.')
        .map(|part| part.trim().parse().unwrap_or(0))
        .collect()
}
