/// Extracts the commit identifier from a Go module version.
///
/// Pseudo-versions (`vX.Y.Z-<timestamp>-<hash>`, `vX.Y.Z-0.<timestamp>-<hash>`,
/// `vX.Y.Z-pre.0.<timestamp>-<hash>`) split into exactly three `-` separated
/// segments and yield the third one verbatim. Anything else is returned as is
/// so tags and bare hashes keep working.
pub fn commit_from_version(version: &str) -> &str {
    let mut parts = version.split('-');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(_), Some(_), Some(hash), None) => hash,
        _ => version,
    }
}

/// Drops `+` build metadata (`+incompatible`) from a revision.
///
/// Commit ids extracted from pseudo-versions of pre-module major versions
/// keep the suffix, which the forge cannot resolve.
pub fn without_build_metadata(revision: &str) -> &str {
    revision
        .split_once('+')
        .map_or(revision, |(revision, _metadata)| revision)
}
