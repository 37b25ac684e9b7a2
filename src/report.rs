use crate::domain::{MatchRecord, RunReport};
use std::io::{self, Write};

/// One output line: `<short id> <repository> <YYYY-MM-DDThh:mm> <author>`
pub fn format_match(record: &MatchRecord) -> String {
    format!(
        "{} {} {} {}",
        record.commit.short_id(),
        record.repository,
        record.commit.authored,
        record.commit.author.name
    )
}

/// Write every match of the run, one per line, in report order
pub fn write_report<W: Write>(out: &mut W, report: &RunReport) -> io::Result<()> {
    for record in report.matches() {
        writeln!(out, "{}", format_match(record))?;
    }
    out.flush()
}
