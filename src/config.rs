use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use regex::{Regex, RegexBuilder};
use serde::Deserialize;
use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use crate::bounds::{BoundPolicy, DEFAULT_LOOKBACK_MONTHS, DEFAULT_MAX_MATCHES};
use crate::cli::CliArgs;
use crate::error::ScanError;
use crate::ports::Clock;

/// Optional settings file, only read when `--config` is given
#[derive(Debug, Deserialize, PartialEq, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub max_matches: Option<usize>,
    pub since: Option<NaiveDate>,
    pub lookback_months: Option<u32>,
    pub jobs: Option<usize>,
}

impl FileConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: FileConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }
}

/// Fully resolved settings for one run
#[derive(Debug, Clone)]
pub struct Config {
    pub pattern: String,
    pub root: PathBuf,
    pub ignore_case: bool,
    pub bounds: BoundPolicy,
    pub jobs: Option<NonZeroUsize>,
}

/// Where the age cutoff comes from, highest precedence first
enum Cutoff {
    Date(NaiveDate),
    Months(u32),
}

impl Cutoff {
    fn resolve(&self, now: DateTime<Utc>, max_matches: usize) -> Result<BoundPolicy, ScanError> {
        match self {
            Cutoff::Date(date) => {
                // A date always has a midnight
                let midnight = date.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc();
                BoundPolicy::new(max_matches, midnight)
            }
            Cutoff::Months(months) => BoundPolicy::lookback(max_matches, now, *months),
        }
    }
}

impl Config {
    /// CLI args override the config file, which overrides the defaults
    pub fn resolve(cli_args: CliArgs, file: FileConfig, clock: &dyn Clock) -> Result<Self> {
        let max_matches = cli_args
            .max_matches
            .or(file.max_matches)
            .unwrap_or(DEFAULT_MAX_MATCHES);

        let cutoff = match (cli_args.since, cli_args.months) {
            (Some(date), _) => Cutoff::Date(date),
            (None, Some(months)) => Cutoff::Months(months),
            (None, None) => match (file.since, file.lookback_months) {
                (Some(date), _) => Cutoff::Date(date),
                (None, Some(months)) => Cutoff::Months(months),
                (None, None) => Cutoff::Months(DEFAULT_LOOKBACK_MONTHS),
            },
        };
        let bounds = cutoff.resolve(clock.now(), max_matches)?;

        let jobs = match cli_args.jobs.or(file.jobs) {
            Some(jobs) => Some(NonZeroUsize::new(jobs).ok_or_else(|| ScanError::InvalidConfig {
                reason: "jobs must be greater than zero".to_string(),
            })?),
            None => None,
        };

        Ok(Self {
            pattern: cli_args.pattern,
            root: cli_args.root,
            ignore_case: cli_args.ignore_case,
            bounds,
            jobs,
        })
    }

    /// Load the file named by `--config` (if any) and resolve against it
    pub fn from_cli_and_file(cli_args: CliArgs, clock: &dyn Clock) -> Result<Self> {
        let file = match &cli_args.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Self::resolve(cli_args, file, clock)
    }

    pub fn compile_pattern(&self) -> Result<Regex, ScanError> {
        RegexBuilder::new(&self.pattern)
            .case_insensitive(self.ignore_case)
            .build()
            .map_err(|source| ScanError::InvalidPattern {
                pattern: self.pattern.clone(),
                source,
            })
    }
}
