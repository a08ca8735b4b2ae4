use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// `character-checker` - tells you whether a set of images shows the same character.
#[derive(Parser, Debug)]
#[command(name = "character-checker")]
#[command(version)]
#[command(
    about = "Character consistency checker: palette analysis plus Gemini vision feedback.",
    long_about = None
)]
pub struct Cli {
    /// Config file (default: ~/.character-checker/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP API
    Serve {
        /// Host to bind to (default: gateway.host)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on, 0 for a random one (default: gateway.port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Analyze image files and print the JSON report
    Analyze {
        /// Images to compare
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Print the color palette of one image as JSON
    Palette {
        file: PathBuf,

        /// Number of colors (default: palette.n_colors)
        #[arg(short, long)]
        colors: Option<usize>,
    },
}
