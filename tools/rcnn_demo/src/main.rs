use clap::Parser;
use miette::Result;
use rcnn_demo::cli::Cli;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    miette::set_panic_hook();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    rcnn_demo::run(Cli::parse())?;

    Ok(())
}
