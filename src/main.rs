use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use go_bump_message::cli::args::CliArgs;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> anyhow::Result<()> {
    let cli_args = CliArgs::parse();
    let bump = cli_args.into_builder().try_build()?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Unable to start the async runtime")?;
    let message = runtime.block_on(bump.generate())?;

    print!("{}", message);
    Ok(())
}
