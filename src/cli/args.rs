use std::path::PathBuf;

use clap::Parser;

use crate::{api::BumpMessageBuilder, commits::MAX_PER_PAGE, diff::FilterMode, BumpMessage};

/// Commit message generator for go.mod bumps.
///
/// Compares go.mod with the version on the base branch and prints the
/// upstream commits pulled in by every bumped module.
#[derive(Debug, Parser)]
#[clap(version)]
pub struct CliArgs {
    /// A comma separated list of import paths to include commit messages for
    #[clap(long, value_delimiter = ',')]
    pub paths: Vec<String>,
    /// Interpret --paths the way older releases did: a module is kept when any
    /// of the given paths is not a prefix of it
    #[clap(long)]
    pub legacy_path_filter: bool,
    /// A branch name to use as a base when comparing the previous go.mod
    #[clap(long, env = "BUMP_BASE_BRANCH", default_value = "master")]
    pub base_branch: String,
    /// Remote holding the base branch
    #[clap(long, env = "BUMP_REMOTE", default_value = "upstream")]
    pub remote: String,
    /// Read the previous go.mod from this file instead of the base branch
    #[clap(long)]
    pub baseline_file: Option<PathBuf>,
    #[clap(short, long, default_value = "go.mod")]
    pub module_location: PathBuf,
    /// Project root, defaults to the current directory
    #[clap(short, long)]
    pub root: Option<PathBuf>,
    /// Pages of history searched per module for the previous revision
    #[clap(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_pages: u32,
    /// Commits requested per page
    #[clap(long, default_value_t = MAX_PER_PAGE, value_parser = clap::value_parser!(u32).range(1..=100))]
    pub per_page: u32,
}

impl CliArgs {
    pub fn into_builder(self) -> BumpMessageBuilder {
        let builder = BumpMessage::builder()
            .module_file_name(self.module_location)
            .remote(self.remote)
            .base_branch(self.base_branch)
            .paths(self.paths)
            .filter_mode(if self.legacy_path_filter {
                FilterMode::Legacy
            } else {
                FilterMode::Include
            })
            .per_page(self.per_page)
            .max_pages(self.max_pages);
        let builder = match self.root {
            Some(root) => builder.root(root),
            None => builder,
        };
        match self.baseline_file {
            Some(path) => builder.baseline_file(path),
            None => builder,
        }
    }
}
