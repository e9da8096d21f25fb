use std::{path::PathBuf, sync::Arc};

use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use mytracks::{cli, config, error, types::PkceToken};
use tokio::sync::Mutex;

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    /// Print debug logging (same as RUST_LOG=debug)
    #[clap(long, short, global = true)]
    verbose: bool,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Log in to TIDAL through the browser
    Auth,

    /// Add the songs of a local music folder to My Tracks
    Sync(SyncOptions),

    /// Replace favorites with higher-quality versions of the same song
    Upgrade(RunOptions),

    /// Remove duplicate favorites, keeping one copy per song
    Dedup(DedupOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct RunOptions {
    /// Show what would change without touching My Tracks
    #[clap(long)]
    dry_run: bool,

    /// Do not ask for confirmation
    #[clap(long, short)]
    yes: bool,

    /// Append the result log to this file
    #[clap(long)]
    log_file: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
pub struct SyncOptions {
    /// Music folder (defaults to MYTRACKS_MUSIC_DIR)
    #[clap(long)]
    dir: Option<PathBuf>,

    #[clap(flatten)]
    run: RunOptions,
}

#[derive(Parser, Debug, Clone)]
pub struct DedupOptions {
    /// Stop after this many remove-and-reread rounds
    #[clap(long, default_value_t = 5)]
    max_rounds: usize,

    /// Among equal quality, keep the preferred edition (remaster, explicit,
    /// stereo, album version) instead of the most recently added copy
    #[clap(long)]
    prefer_versions: bool,

    #[clap(flatten)]
    run: RunOptions,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

impl From<RunOptions> for cli::RunFlags {
    fn from(opt: RunOptions) -> Self {
        cli::RunFlags {
            dry_run: opt.dry_run,
            yes: opt.yes,
            log_file: opt.log_file,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    match cli.command {
        Command::Auth => {
            let oauth_result: Arc<Mutex<Option<PkceToken>>> = Arc::new(Mutex::new(None));
            cli::auth(Arc::clone(&oauth_result)).await;
        }
        Command::Sync(opt) => cli::sync(opt.dir, opt.run.into()).await,
        Command::Upgrade(opt) => cli::upgrade(opt.into()).await,
        Command::Dedup(opt) => cli::dedup(opt.run.into(), opt.max_rounds, opt.prefer_versions).await,
        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
