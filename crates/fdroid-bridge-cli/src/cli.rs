use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser)]
#[command(author, version, about, arg_required_else_help = true)]
pub struct Args {
    /// Set output verbosity
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress outputs
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate metadata records against the required fields
    #[command(arg_required_else_help = true)]
    Validate {
        /// Directory holding one JSON record per package
        #[arg(short, long, default_value = "metadata")]
        metadata_dir: PathBuf,

        /// Package ids to validate
        #[arg(required = true)]
        packages: Vec<String>,
    },

    /// Generate the repository index with fdroidserver
    #[command(arg_required_else_help = true)]
    Generate {
        /// Repository directory fdroid runs in
        repo_dir: PathBuf,

        /// Write a pretty copy of the index to this path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Assemble a minimal index without invoking fdroidserver
    Minimal {
        /// Repository name
        #[arg(short, long)]
        name: String,

        /// Repository description
        #[arg(short, long)]
        description: String,

        /// Directory holding one JSON record per package
        #[arg(short, long, default_value = "metadata")]
        metadata_dir: PathBuf,

        /// Write the index to this path instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
