use anyhow::Result;
use clap::Parser;
use clean_blog::{
    build::build_site,
    cli::{Cli, Commands},
    config::SiteConfig,
    utils::permalink::collapse_day,
};

#[rustfmt::skip]
fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = SiteConfig::load(&cli)?;

    match &cli.command {
        Commands::Build { .. } => {
            build_site(config)?;
        },
        Commands::Rewrite { permalinks } => {
            for permalink in permalinks {
                println!("{}", collapse_day(permalink));
            }
        },
    };

    Ok(())
}
