use log::{debug, info, warn};
use std::path::Path;

use crate::{
    baseline::{self, BaselineSource},
    commits::{self, ListOptions},
    diff::{changed_modules, PathFilter},
    error::BumpError,
    forge::{resolve_repository, CommitSource},
    message::format_message,
    model::{
        manifest::Manifest,
        module::{resolve_modules, Module},
    },
    revision::{commit_from_version, without_build_metadata},
};

/// Options of a single run, fixed before any manifest is read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateOptions {
    pub filter: PathFilter,
    pub listing: ListOptions,
}

/// A manifest snapshot together with the name used to report errors in it.
pub struct Snapshot {
    pub name: String,
    pub content: Vec<u8>,
}

/// Handler of the only command: reads both manifests, lists the commits of
/// every changed module and renders the commit message.
pub async fn do_generate<S: CommitSource>(
    source: &S,
    root: &Path,
    module_file_name: &Path,
    baseline: &BaselineSource,
    options: &GenerateOptions,
) -> Result<String, BumpError> {
    let baseline = read_snapshot(baseline, root, module_file_name)?;
    let current = Snapshot {
        name: module_file_name.display().to_string(),
        content: baseline::read_file(&root.join(module_file_name)).map_err(|source| {
            BumpError::Read {
                role: "current",
                source,
            }
        })?,
    };

    let modules = detect_changes(&baseline, &current, &options.filter)?;
    let lines = collect_commits(source, &modules, options.listing).await?;

    Ok(format_message(lines.iter().map(String::as_str)))
}

fn read_snapshot(
    baseline: &BaselineSource,
    root: &Path,
    module_file_name: &Path,
) -> Result<Snapshot, BumpError> {
    let content = baseline
        .read(root, module_file_name)
        .map_err(|source| BumpError::Read {
            role: "baseline",
            source,
        })?;
    Ok(Snapshot {
        name: baseline.describe(module_file_name),
        content,
    })
}

/// Parses both snapshots and returns the modules whose revision changed.
///
/// An empty result is an error: there is no message to write.
pub fn detect_changes(
    baseline: &Snapshot,
    current: &Snapshot,
    filter: &PathFilter,
) -> Result<Vec<Module>, BumpError> {
    let old = resolve_modules(&parse_snapshot(baseline)?);
    let new = resolve_modules(&parse_snapshot(current)?);

    let changed = changed_modules(&new, &old, filter);
    if changed.is_empty() {
        return Err(BumpError::NoChanges);
    }

    debug!("Updated modules: {:?}", changed);
    Ok(changed)
}

fn parse_snapshot(snapshot: &Snapshot) -> Result<Manifest, BumpError> {
    let manifest = Manifest::parse(&snapshot.name, &snapshot.content)?;
    debug!(
        "Parsed {} for {} (go {}): {} requirements, {} indirect",
        snapshot.name,
        manifest.module.as_deref().unwrap_or("<unnamed module>"),
        manifest.go_version.as_deref().unwrap_or("unspecified"),
        manifest.requirements.len(),
        manifest
            .requirements
            .iter()
            .filter(|requirement| requirement.indirect)
            .count()
    );
    Ok(manifest)
}

/// Lists the commits of each module in order. The first failure aborts.
pub async fn collect_commits<S: CommitSource>(
    source: &S,
    modules: &[Module],
    listing: ListOptions,
) -> Result<Vec<String>, BumpError> {
    let mut lines = Vec::new();

    for module in modules {
        let repository = resolve_repository(&module.repository).map_err(|source| {
            BumpError::UnresolvableRepository {
                module: module.name.clone(),
                source,
            }
        })?;
        // Commit ids of `+incompatible` pseudo-versions carry the suffix.
        let from_revision = without_build_metadata(commit_from_version(&module.current_revision));
        let to_revision = without_build_metadata(commit_from_version(
            module.previous_revision.as_deref().unwrap_or_default(),
        ));

        info!("Listing commits of {} from {}", module, repository);
        let range = commits::list_commits(source, &repository, from_revision, to_revision, listing)
            .await
            .map_err(|source| BumpError::CommitFetch {
                module: module.name.clone(),
                source,
            })?;

        if !range.stop_found {
            warn!(
                "Previous revision {} of {} was not found within {} page(s) of history, the commit list may be incomplete",
                to_revision, module.name, listing.max_pages
            );
        }
        lines.extend(range.lines);
    }

    Ok(lines)
}
