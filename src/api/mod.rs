use std::path::PathBuf;

use crate::{
    baseline::BaselineSource,
    cli::command_handlers::{do_generate, GenerateOptions},
    error::BumpError,
    forge::github::GitHubClient,
};

mod builder;

pub use builder::BumpMessageBuilder;

/// A configured run of the generator.
pub struct BumpMessage {
    client: GitHubClient,
    root: PathBuf,
    module_file_name: PathBuf,
    baseline: BaselineSource,
    options: GenerateOptions,
}

impl BumpMessage {
    pub fn builder() -> BumpMessageBuilder {
        BumpMessageBuilder::default()
    }

    /// Compares the baseline manifest with the current one and renders the
    /// commit message for every module whose revision changed.
    pub async fn generate(&self) -> Result<String, BumpError> {
        do_generate(
            &self.client,
            &self.root,
            &self.module_file_name,
            &self.baseline,
            &self.options,
        )
        .await
    }
}
