use std::{env, path::PathBuf};

use crate::{
    baseline::BaselineSource,
    cli::command_handlers::GenerateOptions,
    commits::ListOptions,
    config::{BumpConfig, ConfigurationError},
    diff::{FilterMode, PathFilter},
    error::BumpError,
    forge::github::GitHubClient,
    BumpMessage,
};

#[derive(Default)]
pub struct BumpMessageBuilder {
    // All other paths are relative to `root`
    root: Option<PathBuf>,
    module_file_name: Option<PathBuf>,
    remote: Option<String>,
    base_branch: Option<String>,
    baseline_file: Option<PathBuf>,
    paths: Vec<String>,
    filter_mode: FilterMode,
    per_page: Option<u32>,
    max_pages: Option<u32>,
    config: Option<BumpConfig>,
}

impl BumpMessageBuilder {
    /// Project root directory.
    ///
    /// Defaults to the current directory.
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Name of the manifest file.
    ///
    /// Defaults to `go.mod`.
    pub fn module_file_name(mut self, path: impl Into<PathBuf>) -> Self {
        self.module_file_name = Some(path.into());
        self
    }

    /// Remote the base branch is read from.
    ///
    /// Defaults to `upstream`.
    pub fn remote(mut self, remote: impl Into<String>) -> Self {
        self.remote = Some(remote.into());
        self
    }

    /// Branch holding the previous manifest.
    ///
    /// Defaults to `master`.
    pub fn base_branch(mut self, branch: impl Into<String>) -> Self {
        self.base_branch = Some(branch.into());
        self
    }

    /// Read the previous manifest from a file instead of git.
    pub fn baseline_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.baseline_file = Some(path.into());
        self
    }

    /// Import path prefixes to include commit messages for.
    pub fn paths(mut self, paths: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.paths = paths.into_iter().map(Into::into).collect();
        self
    }

    pub fn filter_mode(mut self, mode: FilterMode) -> Self {
        self.filter_mode = mode;
        self
    }

    /// Commits requested per page, at most 100.
    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }

    /// Pages of history inspected per module while looking for the previous
    /// revision.
    ///
    /// Defaults to 1.
    pub fn max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = Some(max_pages);
        self
    }

    /// Use this configuration instead of reading it from the environment.
    pub fn config(mut self, config: BumpConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn try_build(self) -> Result<BumpMessage, BumpError> {
        let Self {
            root,
            module_file_name,
            remote,
            base_branch,
            baseline_file,
            paths,
            filter_mode,
            per_page,
            max_pages,
            config,
        } = self;

        let config = match config {
            Some(config) => config,
            None => BumpConfig::load()?,
        };
        let client = GitHubClient::new(&config.api_url, &config.token)
            .map_err(ConfigurationError::from)?;

        let root = match root {
            Some(root) => root,
            None => env::current_dir().map_err(ConfigurationError::WorkingDirectory)?,
        };

        let module_file_name = module_file_name.unwrap_or_else(|| PathBuf::from("go.mod"));

        let baseline = match baseline_file {
            Some(path) => BaselineSource::File(path),
            None => BaselineSource::Branch {
                remote: remote.unwrap_or_else(|| "upstream".to_owned()),
                branch: base_branch.unwrap_or_else(|| "master".to_owned()),
            },
        };

        let defaults = ListOptions::default();
        let options = GenerateOptions {
            filter: PathFilter::new(paths, filter_mode),
            listing: ListOptions {
                per_page: per_page.unwrap_or(defaults.per_page),
                max_pages: max_pages.unwrap_or(defaults.max_pages),
            },
        };

        Ok(BumpMessage {
            client,
            root,
            module_file_name,
            baseline,
            options,
        })
    }
}
