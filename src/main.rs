//! prland - land file changes on GitHub unattended

mod cli;

use anyhow::Result;
use clap::{ArgAction, Args, Parser, Subcommand};
use cli::land::{LandOptions, run_land};
use cli::style::{CROSS, Stylize};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "prland")]
#[command(about = "Land file changes on GitHub: branch, pull request, CI, merge")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Config file (default: <config dir>/prland/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Commit file edits to a new branch, open a PR, wait for CI, merge, wait again
    Land(LandArgs),
}

#[derive(Args)]
struct LandArgs {
    /// Target repository as <owner>/<repository>
    repo: String,

    /// Branch to create and push
    #[arg(short, long)]
    branch: String,

    /// Branch to merge into
    #[arg(long, default_value = "main")]
    base: String,

    /// Commit message
    #[arg(short, long)]
    message: String,

    /// Write CONTENT to PATH (repeatable)
    #[arg(long = "write", value_name = "PATH=CONTENT")]
    writes: Vec<String>,

    /// Delete PATH (repeatable)
    #[arg(long = "delete", value_name = "PATH")]
    deletes: Vec<String>,

    /// Status check that must pass on the PR head
    #[arg(long)]
    check: String,

    /// Status check that must pass on the merge commit (default: --check)
    #[arg(long)]
    merge_check: Option<String>,

    /// PR title (default: first line of the commit message)
    #[arg(long)]
    title: Option<String>,

    /// PR body
    #[arg(long)]
    body: Option<String>,

    /// Commit author name
    #[arg(long, default_value = "prland")]
    author_name: String,

    /// Commit author email
    #[arg(long, default_value = "prland@users.noreply.github.com")]
    author_email: String,

    /// Seconds to wait for each status check
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Seconds between status polls
    #[arg(long)]
    poll_interval_secs: Option<u64>,

    /// GitHub Enterprise host
    #[arg(long)]
    host: Option<String>,

    /// Directory to create the temporary clone in (default: current directory)
    #[arg(long)]
    work_dir: Option<PathBuf>,
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("warn,prland=debug"),
        _ => EnvFilter::new("warn,prland=trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Land(args) => {
            let options = LandOptions {
                branch: args.branch,
                base: args.base,
                title: args.title,
                body: args.body,
                check: args.check,
                merge_check: args.merge_check,
                writes: args.writes,
                deletes: args.deletes,
                message: args.message,
                author_name: args.author_name,
                author_email: args.author_email,
                timeout_secs: args.timeout_secs,
                poll_interval_secs: args.poll_interval_secs,
                host: args.host,
                work_dir: args.work_dir,
            };
            run_land(&args.repo, cli.config.as_deref(), options).await?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            anstream::eprintln!("{} {e:#}", format!("{CROSS} error:").error());
            ExitCode::FAILURE
        }
    }
}
