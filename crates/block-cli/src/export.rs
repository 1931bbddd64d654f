//! Dry-run export of scheduled entries.
//!
//! The engine produces wall-clock instants without a zone. Export pins them
//! to the configured IANA zone and writes UTC instants, the form the
//! time-tracking service accepts.
//!
//! Files are CSV with a `description,start,end,billable,projectId,taskId`
//! header by default, or a JSON array of the same records.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use block_engine::ScheduledEntry;
use chrono::{DateTime, Duration, LocalResult, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use clap::ValueEnum;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl ExportFormat {
    fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportEntry {
    pub description: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub billable: bool,
    pub project_id: String,
    pub task_id: String,
}

/// Resolve a wall-clock time in `tz`.
///
/// Ambiguous times (clocks going back) take the earlier instant. Times that
/// fall in a gap (clocks going forward) are shifted forward by an hour.
pub fn localize(naive: NaiveDateTime, tz: Tz) -> Result<DateTime<Utc>> {
    let resolved = match tz.from_local_datetime(&naive) {
        LocalResult::Single(t) => Some(t),
        LocalResult::Ambiguous(earliest, _) => Some(earliest),
        LocalResult::None => tz.from_local_datetime(&(naive + Duration::hours(1))).earliest(),
    };
    resolved
        .map(|t| t.with_timezone(&Utc))
        .with_context(|| format!("{naive} does not exist in {tz}"))
}

pub fn export_entries(entries: &[ScheduledEntry], tz: Tz) -> Result<Vec<ExportEntry>> {
    entries
        .iter()
        .map(|entry| {
            Ok(ExportEntry {
                description: entry.description.clone(),
                start: localize(entry.start, tz)?,
                end: localize(entry.end, tz)?,
                billable: entry.billable,
                project_id: entry.project_id.clone(),
                task_id: entry.task_id.clone(),
            })
        })
        .collect()
}

/// One exported entry tagged with its client, for reports covering several
/// clients at once.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct ClientRow<'a> {
    client: &'a str,
    description: &'a str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    billable: bool,
    project_id: &'a str,
    task_id: &'a str,
}

/// `time_entries_<client>.<ext>` with path-hostile characters replaced.
pub fn export_file_name(client: &str, format: ExportFormat) -> String {
    let safe: String = client
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    format!("time_entries_{safe}.{}", format.extension())
}

/// Write `rows` as CSV, header first.
pub fn write_csv<W: Write>(writer: W, rows: &[ExportEntry]) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for row in rows {
        csv.serialize(row)?;
    }
    csv.flush()?;
    Ok(())
}

/// Write the rows of several clients as one CSV with a leading `client`
/// column, in client order.
pub fn write_client_csv<W: Write>(writer: W, report: &[(String, Vec<ExportEntry>)]) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for (client, rows) in report {
        for row in rows {
            csv.serialize(ClientRow {
                client,
                description: &row.description,
                start: row.start,
                end: row.end,
                billable: row.billable,
                project_id: &row.project_id,
                task_id: &row.task_id,
            })?;
        }
    }
    csv.flush()?;
    Ok(())
}

pub fn write_export(
    dir: &Path,
    client: &str,
    rows: &[ExportEntry],
    format: ExportFormat,
) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
    let path = dir.join(export_file_name(client, format));
    let write_failed = || format!("Failed to write file: {}", path.display());

    match format {
        ExportFormat::Csv => {
            let file = std::fs::File::create(&path).with_context(write_failed)?;
            write_csv(file, rows).with_context(write_failed)?;
        }
        ExportFormat::Json => {
            let json = serde_json::to_string_pretty(rows)?;
            std::fs::write(&path, json).with_context(write_failed)?;
        }
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn naive(month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, month, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn utc_is_identity() {
        let t = localize(naive(3, 5, 9, 30), chrono_tz::UTC).unwrap();
        assert_eq!(t.to_rfc3339(), "2024-03-05T09:30:00+00:00");
    }

    #[test]
    fn winter_madrid_is_one_hour_ahead() {
        let t = localize(naive(3, 5, 9, 0), chrono_tz::Europe::Madrid).unwrap();
        assert_eq!(t, Utc.with_ymd_and_hms(2024, 3, 5, 8, 0, 0).unwrap());
    }

    #[test]
    fn spring_forward_gap_shifts_one_hour() {
        // 2024-03-31 02:30 does not exist in Madrid; 03:30 CEST is 01:30 UTC.
        let t = localize(naive(3, 31, 2, 30), chrono_tz::Europe::Madrid).unwrap();
        assert_eq!(t, Utc.with_ymd_and_hms(2024, 3, 31, 1, 30, 0).unwrap());
    }

    #[test]
    fn fall_back_ambiguity_takes_earliest() {
        // 2024-10-27 02:30 happens twice in Madrid; the first is CEST (UTC+2).
        let t = localize(naive(10, 27, 2, 30), chrono_tz::Europe::Madrid).unwrap();
        assert_eq!(t, Utc.with_ymd_and_hms(2024, 10, 27, 0, 30, 0).unwrap());
    }

    #[test]
    fn file_names_are_sanitized() {
        assert_eq!(export_file_name("Globex", ExportFormat::Csv), "time_entries_Globex.csv");
        assert_eq!(
            export_file_name(" Acme Corp/EU ", ExportFormat::Json),
            "time_entries_Acme_Corp_EU.json"
        );
    }

    fn row(description: &str) -> ExportEntry {
        ExportEntry {
            description: description.to_string(),
            start: Utc.with_ymd_and_hms(2024, 3, 5, 9, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2024, 3, 5, 13, 0, 0).unwrap(),
            billable: true,
            project_id: "p-1".to_string(),
            task_id: "t-1".to_string(),
        }
    }

    #[test]
    fn csv_uses_time_entry_columns() {
        let mut out = Vec::new();
        write_csv(&mut out, &[row("Review, part 1")]).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "description,start,end,billable,projectId,taskId\n\
             \"Review, part 1\",2024-03-05T09:00:00Z,2024-03-05T13:00:00Z,true,p-1,t-1\n"
        );
    }

    #[test]
    fn client_csv_prefixes_client_column() {
        let mut out = Vec::new();
        let report = vec![("Globex".to_string(), vec![row("a")])];
        write_client_csv(&mut out, &report).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("client,description,start,end,billable,projectId,taskId\n"));
        assert!(text.contains("Globex,a,2024-03-05T09:00:00Z"));
    }
}
