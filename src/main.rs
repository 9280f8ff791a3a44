//! `forge` - asset registry and static build CLI.

use anyhow::Result;
use assetforge::cli::{self, Cli, Commands};
use assetforge::config::ForgeConfig;
use assetforge::logger;
use clap::{ColorChoice, Parser};

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let mut config = ForgeConfig::load(&cli.config)?;

    match &cli.command {
        Commands::Build { build_args } => {
            cli::build::apply_build_args(&mut config, build_args);
            cli::build::build_assets(&config).map(|_| ())
        }
        Commands::Resolve { uris } => cli::query::resolve(&config.to_registry()?, uris),
        Commands::Glob { patterns } => cli::query::glob(&config.to_registry()?, patterns),
        Commands::Packages { production } => {
            let registry = config.to_registry()?;
            cli::query::packages(&config, &registry, *production)
        }
    }
}
