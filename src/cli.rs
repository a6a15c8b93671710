use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Tracks interest and skill counts on profile pages week over week")]
#[command(version)]
pub struct Cli {
    /// Config file (defaults to the platform config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Snapshot database (overrides the config file)
    #[arg(long, global = true)]
    pub database: Option<PathBuf>,

    /// Show debug-level output
    #[arg(long, short = 'v', global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Visit every listed profile, record snapshots, compare and write reports
    Run(RunArgs),

    /// Write the trend table from the full snapshot history
    Report(ReportArgs),

    /// Compare the latest batch with the prior batch
    Compare(CompareArgs),

    /// Dump every stored snapshot
    History(HistoryArgs),
}

#[derive(Parser)]
pub struct RunArgs {
    /// File with one profile URL per line
    #[arg(long)]
    pub entities: Option<PathBuf>,

    /// Maximum number of profiles to visit in this run
    #[arg(long)]
    pub limit: Option<usize>,

    /// WebDriver endpoint (chromedriver)
    #[arg(long)]
    pub webdriver: Option<String>,

    /// Do not open the login page and wait for a manual sign-in
    #[arg(long, default_value_t = false)]
    pub no_login_prompt: bool,

    /// Directory for the report artifacts
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Parser)]
pub struct ReportArgs {
    /// Directory for the report artifacts
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Print rows as JSON instead of writing files
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Parser)]
pub struct CompareArgs {
    /// How far back the prior batch must be ("7d", "36h")
    #[arg(long, value_parser = humantime::parse_duration)]
    pub cutoff: Option<std::time::Duration>,
}

#[derive(Parser)]
pub struct HistoryArgs {
    /// Group by profile, oldest first, instead of newest first
    #[arg(long, default_value_t = false)]
    pub by_entity: bool,
}
