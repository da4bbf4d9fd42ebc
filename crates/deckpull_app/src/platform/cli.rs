use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Upload PowerPoint decks to an extraction service and follow each job to completion.
#[derive(Debug, Parser)]
#[command(name = "deckpull", version, about)]
pub struct Cli {
    /// `.pptx` files to extract, processed one after another
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Extraction service root URL
    #[arg(long, value_name = "URL")]
    pub server: Option<String>,

    /// Keep the slide's own text order instead of sorting by column
    #[arg(long)]
    pub no_column_sort: bool,

    /// Drop formatting in the generated document
    #[arg(long)]
    pub no_keep_format: bool,

    /// Save each finished document locally
    #[arg(long)]
    pub download: bool,

    /// Where downloaded documents go
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// RON config file
    #[arg(long, value_name = "PATH", default_value = "deckpull.ron")]
    pub config: PathBuf,

    /// Where log output goes
    #[arg(long, value_enum, default_value_t = LogTarget::File)]
    pub log: LogTarget,

    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogTarget {
    Terminal,
    File,
    Both,
}
