use crate::domain::Commit;
use crate::error::{Result, ScanError};
use chrono::{DateTime, Months, Utc};

/// Default number of matches collected per repository
pub const DEFAULT_MAX_MATCHES: usize = 100;

/// Default age cutoff, counted back from the start of the run
pub const DEFAULT_LOOKBACK_MONTHS: u32 = 18;

/// Limits applied to every repository walk of a run
///
/// Both checks are evaluated after a linear commit has been examined, so the
/// commit that reaches a limit can itself still be a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundPolicy {
    max_matches: usize,
    min_timestamp: DateTime<Utc>,
}

impl BoundPolicy {
    pub fn new(max_matches: usize, min_timestamp: DateTime<Utc>) -> Result<Self> {
        if max_matches == 0 {
            return Err(ScanError::InvalidConfig {
                reason: "max_matches must be greater than zero".to_string(),
            });
        }
        Ok(Self {
            max_matches,
            min_timestamp,
        })
    }

    /// Cutoff `months` before `now`
    pub fn lookback(max_matches: usize, now: DateTime<Utc>, months: u32) -> Result<Self> {
        let min_timestamp = now
            .checked_sub_months(Months::new(months))
            .ok_or_else(|| ScanError::InvalidConfig {
                reason: format!("lookback of {} months is out of range", months),
            })?;
        Self::new(max_matches, min_timestamp)
    }

    pub fn max_matches(&self) -> usize {
        self.max_matches
    }

    pub fn min_timestamp(&self) -> DateTime<Utc> {
        self.min_timestamp
    }

    pub fn match_limit_reached(&self, count: usize) -> bool {
        count >= self.max_matches
    }

    /// True when the commit was authored strictly before the cutoff
    pub fn too_old(&self, commit: &Commit) -> bool {
        DateTime::<Utc>::from_timestamp(commit.authored.seconds, 0)
            .is_some_and(|authored| authored < self.min_timestamp)
    }
}
