use thiserror::Error;

use crate::{
    baseline::ReadError,
    config::ConfigurationError,
    forge::{CommitFetchError, UnresolvableRepository},
    model::ParseError,
};

/// Terminal failure of a run, naming the step that failed.
#[derive(Error, Debug)]
pub enum BumpError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error("Unable to read the {role} manifest: {source}")]
    Read {
        role: &'static str,
        source: ReadError,
    },
    #[error("Unable to parse {0}")]
    Parse(#[from] ParseError),
    #[error("No modules were updated in this branch")]
    NoChanges,
    #[error("Unable to resolve the repository of {module}: {source}")]
    UnresolvableRepository {
        module: String,
        source: UnresolvableRepository,
    },
    #[error("Unable to list commits for {module}: {source}")]
    CommitFetch {
        module: String,
        source: CommitFetchError,
    },
}
