//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::CONFIG_FILE;
use crate::pipeline::StageName;
use crate::task::Entry;

/// Front-end asset build runner
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Build for production (minified, no source maps)
    #[arg(long, global = true)]
    pub production: bool,

    /// Build for staging (optimized like production)
    #[arg(long, global = true)]
    pub staging: bool,

    /// Build for development (the default outside `deploy`)
    #[arg(long, global = true, alias = "development")]
    pub dev: bool,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path (default: sluice.toml)
    #[arg(short = 'C', long, global = true, default_value = CONFIG_FILE, value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Task to run; without one, build every stage and watch
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available tasks
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Remove build outputs and the package directory
    Clean,
    /// Compile stylesheets
    Styles,
    /// Bundle scripts
    Scripts,
    /// Optimize images
    Images,
    /// Copy fonts
    Fonts,
    /// Re-run stages when their sources change
    Watch,
    /// Clean, then run every stage
    #[command(visible_alias = "b")]
    Build,
    /// `build` for the production environment
    Production,
    /// Build, then copy the deployable file set to the package directory
    Package,
    /// Build, then upload files newer than the remote copy
    #[command(visible_alias = "d")]
    Deploy,
}

impl Cli {
    /// Environment selector flags given on the command line.
    pub fn env_flags(&self) -> Vec<&'static str> {
        [
            (self.production, "production"),
            (self.staging, "staging"),
            (self.dev, "dev"),
        ]
        .into_iter()
        .filter_map(|(set, flag)| set.then_some(flag))
        .collect()
    }

    pub fn entry(&self) -> Entry {
        match self.command {
            None => Entry::Default,
            Some(Commands::Clean) => Entry::Clean,
            Some(Commands::Styles) => Entry::Stage(StageName::Styles),
            Some(Commands::Scripts) => Entry::Stage(StageName::Scripts),
            Some(Commands::Images) => Entry::Stage(StageName::Images),
            Some(Commands::Fonts) => Entry::Stage(StageName::Fonts),
            Some(Commands::Watch) => Entry::Watch,
            Some(Commands::Build) => Entry::Build,
            Some(Commands::Production) => Entry::Production,
            Some(Commands::Package) => Entry::Package,
            Some(Commands::Deploy) => Entry::Deploy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("sluice").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_no_subcommand_is_default() {
        let cli = parse(&[]);
        assert_eq!(cli.entry(), Entry::Default);
        assert!(cli.env_flags().is_empty());
        assert_eq!(cli.config, PathBuf::from("sluice.toml"));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = parse(&["deploy", "--staging", "-v", "-C", "site.toml"]);
        assert_eq!(cli.entry(), Entry::Deploy);
        assert_eq!(cli.env_flags(), vec!["staging"]);
        assert!(cli.verbose);
        assert_eq!(cli.config, PathBuf::from("site.toml"));
    }

    #[test]
    fn test_development_alias() {
        let cli = parse(&["--development", "--production", "build"]);
        assert_eq!(cli.env_flags(), vec!["production", "dev"]);
    }

    #[test]
    fn test_stage_commands() {
        assert_eq!(parse(&["fonts"]).entry(), Entry::Stage(StageName::Fonts));
        assert_eq!(parse(&["b"]).entry(), Entry::Build);
    }
}
