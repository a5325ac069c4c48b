use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// root directory path
    #[arg(short, long, default_value = "./")]
    pub root: PathBuf,

    /// Output directory path related to `root`
    #[arg(short, long, default_value = "public")]
    pub output: PathBuf,

    /// Content manifest (JSON) path related to `root`
    #[arg(short, long, default_value = "content.json")]
    pub content: PathBuf,

    /// Theme directory path related to `root`
    #[arg(short, long, default_value = "theme")]
    pub theme: PathBuf,

    /// Config file path related to `root`
    #[arg(short = 'C', long, default_value = "clean-blog.toml")]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Generate the feed, the sitemap and the raw images into the output directory
    Build {},

    /// Print permalinks with the day segment dropped
    Rewrite {
        /// permalinks to rewrite, e.g. `2021/03/15/hello/`
        #[arg(required = true)]
        permalinks: Vec<String>,
    },
}
