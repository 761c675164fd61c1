use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use lessongrab::cli;
use lessongrab::cli::scrape_cmd::ScrapeOpts;
use lessongrab::config::DEFAULT_HOST;

#[derive(Parser)]
#[command(
    name = "lessongrab",
    about = "Walk an online course and record each lesson's embedded media id",
    version,
    after_help = "Run 'lessongrab <command> --help' for details on each command."
)]
struct Cli {
    /// Suppress the summary line
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Enable verbose/debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape every lesson in a course manifest and write its media catalog
    Scrape {
        /// Course manifest JSON (the platform's course API response)
        #[arg(default_value = "response.json")]
        manifest: PathBuf,
        /// Session token (remember_user_token). Falls back to LESSONGRAB_COOKIE.
        #[arg(long)]
        cookie: Option<String>,
        /// Platform host serving the course
        #[arg(long, default_value = DEFAULT_HOST)]
        host: String,
        /// Directory the catalog is written into (must already exist)
        #[arg(long, default_value = "./jsons")]
        out_dir: PathBuf,
        /// Seconds to wait for the lesson iframe and its player script
        #[arg(long, default_value = "10")]
        player_timeout: u64,
    },
    /// Check environment readiness (Chromium, output directory, token)
    Doctor {
        /// Output directory the scrape would write into
        #[arg(long, default_value = "./jsons")]
        out_dir: PathBuf,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_directive = if cli.verbose {
        "lessongrab=debug"
    } else {
        "lessongrab=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(default_directive.parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Scrape {
            manifest,
            cookie,
            host,
            out_dir,
            player_timeout,
        } => {
            cli::scrape_cmd::run(ScrapeOpts {
                manifest,
                cookie,
                host,
                out_dir,
                player_timeout_secs: player_timeout,
                quiet: cli.quiet,
            })
            .await
        }
        Commands::Doctor { out_dir } => cli::doctor::run(&out_dir).await,
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "lessongrab", &mut std::io::stdout());
            Ok(())
        }
    };

    // Consistent exit codes: 0=success, 1=error
    if let Err(e) = &result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }

    result
}
