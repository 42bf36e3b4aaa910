mod commands;

use albumrip::chromium::ChromiumLauncher;
use albumrip::PipelineConfig;
use clap::Parser;
use commands::{execute_command, Commands};
use std::path::PathBuf;

/// Save whole albums through a converter site, one browser per album
#[derive(Parser)]
#[command(
    name = "albumrip",
    about = "Album track discovery, conversion and cover art saving",
    long_about = None
)]
struct Cli {
    /// Show detailed debug information
    #[arg(long, global = true)]
    verbose: bool,

    /// Configuration file (defaults to <config dir>/albumrip/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Run the browser without a window
    #[arg(long, global = true)]
    headless: bool,

    /// Abandon an album at its first failed track
    #[arg(long, global = true)]
    strict_tracks: bool,

    /// Browser binary to launch instead of the detected Chromium
    #[arg(long, global = true)]
    chrome: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let mut config = match PipelineConfig::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {e}");
            std::process::exit(1);
        }
    };
    if args.headless {
        config.headless = true;
    }
    if args.strict_tracks {
        config.isolate_track_failures = false;
    }

    if args.verbose {
        println!(
            "📁 Saving albums under {}",
            config.storage_root.join(&config.downloads_dir).display()
        );
    }

    let mut launcher = ChromiumLauncher::new();
    if let Some(chrome) = args.chrome {
        launcher = launcher.with_executable(chrome);
    }

    if let Err(e) = execute_command(args.command, launcher, config).await {
        eprintln!("❌ Command failed: {e}");
        std::process::exit(1);
    }

    Ok(())
}
