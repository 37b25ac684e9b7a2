use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, PartialEq)]
#[command(name = "histgrep")]
#[command(about = "Find commits whose diff matches a regex, across every git repository in a directory")]
pub struct CliArgs {
    /// Regular expression matched against the patch text of each changed file
    pub pattern: String,

    /// Directory whose immediate subdirectories are git repositories
    pub root: PathBuf,

    /// Maximum number of matching commits reported per repository
    #[arg(long)]
    pub max_matches: Option<usize>,

    /// Stop walking a repository at the first commit authored before this date (YYYY-MM-DD)
    #[arg(long, conflicts_with = "months")]
    pub since: Option<NaiveDate>,

    /// Stop walking at commits older than this many months
    #[arg(long)]
    pub months: Option<u32>,

    /// Number of repositories scanned concurrently
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Match case-insensitively
    #[arg(short = 'i', long)]
    pub ignore_case: bool,

    /// Path to an optional configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log progress to stderr
    #[arg(short, long)]
    pub verbose: bool,
}
