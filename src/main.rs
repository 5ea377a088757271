#![allow(clippy::enum_variant_names)]
#![allow(clippy::module_inception)]

use clap::Parser as _;
use supports_color::Stream;
use tracing::debug;

use crate::{
    application::{Application, ApplicationError},
    cli::Cli,
};

mod application;
mod cli;
mod config;
mod ext;
mod filesystem;
mod output;

#[compio::main]
#[snafu::report]
async fn main() -> Result<(), ApplicationError> {
    let cli_args = Cli::parse();
    setup_tracing(&cli_args);
    setup_colors();
    debug!("Parsed CLI arguments: {cli_args:?}");

    let outcome = Application::run(cli_args).await?;
    debug!("Finished: {outcome:?}");

    Ok(())
}

fn setup_tracing(cli_args: &Cli) {
    if let Some(filter) = cli_args.log_level.to_tracing_filter() {
        tracing_subscriber::fmt()
            .with_max_level(filter)
            .with_writer(std::io::stderr)
            .without_time()
            .compact()
            .init();
    }
}

fn setup_colors() {
    colored::control::set_override(supports_color::on(Stream::Stdout).is_some());
}
