use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;
mod error;

use commands::render::RenderArgs;
use commands::share::ShareAction;
use config::Config;
use error::{print_error_and_exit, CliError};

#[derive(Parser)]
#[command(name = "emerald")]
#[command(about = "Emerald - alignment dot-matrix export")]
#[command(version)]
#[command(long_about = "
Emerald renders alignment dot matrices with their safety windows and exports
them as SVG, PNG or JPEG.

Examples:
  emerald render --input snapshot.json --format svg --out plots/
  emerald render --input snapshot.json --format png --scale 3 --no-minimap
  emerald windows --input snapshot.json --json
  emerald share encode --seq-a P69905 --seq-b P68871 --alpha 0.75
  emerald share decode 'https://emerald.example/?seqA=P69905&seqB=P68871'
  emerald config --example
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Export a snapshot as SVG, PNG or JPEG
    Render(RenderArgs),

    /// List the merged safety windows of a snapshot
    Windows {
        /// Export snapshot (JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Emit JSON instead of a listing
        #[arg(long)]
        json: bool,

        /// Report 0-based residue ranges
        #[arg(long)]
        ranges: bool,
    },

    /// Encode or decode shareable URLs
    Share {
        #[command(subcommand)]
        action: ShareAction,
    },

    /// Show or generate configuration
    Config {
        /// Print an example configuration
        #[arg(long)]
        example: bool,

        /// Write the example configuration to this path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn setup_logging(verbose: u8, quiet: bool) {
    let log_level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", log_level);
    }

    env_logger::Builder::from_default_env().format_timestamp_secs().init();
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Render(args) => {
            let path = commands::render::execute(&config, args)?;
            println!("{}", path.display());
        }
        Commands::Windows { input, json, ranges } => {
            commands::windows::execute(&config, input, json, ranges)?;
        }
        Commands::Share { action } => {
            commands::share::execute(&config, action)?;
        }
        Commands::Config { example, output } => {
            commands::config::execute(&config, example, output)?;
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    match run(cli) {
        Err(err) => match err.downcast_ref::<CliError>() {
            Some(cli_err) => print_error_and_exit(cli_err),
            None => Err(err),
        },
        ok => ok,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_render_flags() {
        let cli = Cli::try_parse_from([
            "emerald", "render", "--input", "s.json", "--format", "jpeg", "--scale", "2", "--no-minimap", "-vv",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Render(args) => {
                assert_eq!(args.format, Some(commands::render::OutputFormat::Jpeg));
                assert_eq!(args.scale, Some(2.0));
                assert!(args.no_minimap);
                assert!(!args.no_grid);
            }
            _ => panic!("expected render"),
        }
    }

    #[test]
    fn test_parse_share_encode() {
        let cli = Cli::try_parse_from(["emerald", "share", "encode", "--seq-a", "P69905", "--cost-matrix-type", "3"])
            .unwrap();
        match cli.command {
            Commands::Share {
                action: ShareAction::Encode(args),
            } => {
                assert_eq!(args.seq_a.as_deref(), Some("P69905"));
                assert_eq!(args.cost_matrix_type, Some(3));
            }
            _ => panic!("expected share encode"),
        }
    }
}
