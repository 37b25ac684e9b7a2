use anyhow::Result;
use clap::Parser;
use histgrep::cli::CliArgs;
use histgrep::config::Config;
use histgrep::git::GitOpener;
use histgrep::ports::SystemClock;
use histgrep::report::write_report;
use histgrep::Coordinator;
use std::io;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    // Logs go to stderr so stdout only carries matches
    let default_level = if cli_args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();

    let config = Config::from_cli_and_file(cli_args, &SystemClock)?;
    let regex = config.compile_pattern()?;
    info!(
        "Searching {} for {:?} (max {} matches per repository, since {})",
        config.root.display(),
        config.pattern,
        config.bounds.max_matches(),
        config.bounds.min_timestamp().format("%Y-%m-%d")
    );

    let mut coordinator = Coordinator::new(GitOpener::new(), config.bounds);
    if let Some(jobs) = config.jobs {
        coordinator = coordinator.with_jobs(jobs);
    }

    let report = coordinator.run(&regex, &config.root)?;

    let stdout = io::stdout();
    write_report(&mut stdout.lock(), &report)?;
    Ok(())
}
