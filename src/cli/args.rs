//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::CONFIG_FILE;

/// Asset registry and static build tool
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path, searched upward from the current directory
    #[arg(short = 'C', long, global = true, default_value = CONFIG_FILE, value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Render every package and served file into the output root
    #[command(visible_alias = "b")]
    Build {
        #[command(flatten)]
        build_args: BuildArgs,
    },

    /// Print the local source file behind each public URI
    #[command(visible_alias = "r")]
    Resolve {
        #[arg(required = true, value_name = "URI")]
        uris: Vec<String>,
    },

    /// List served files matching each pattern, in match order
    #[command(visible_alias = "g")]
    Glob {
        #[arg(required = true, value_name = "PATTERN")]
        patterns: Vec<String>,
    },

    /// Print the HTML tags for every package
    #[command(visible_alias = "p")]
    Packages {
        /// One tag per package instead of one per member file
        #[arg(short, long)]
        production: bool,
    },
}

#[derive(clap::Args, Debug, Clone)]
pub struct BuildArgs {
    /// Remove the output directory before building
    #[arg(short, long)]
    pub clean: bool,

    /// Output directory (relative to the app root)
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// Skip minification of package output
    #[arg(long)]
    pub no_minify: bool,
}
