//! Task input: one record per task, naming the client, the task description
//! and the day of the month it happened on.
//!
//! The native layout is a CSV file with a `Cliente,Tarea,Dia` header. Files
//! ending in `.json` are read as an array of `{client, description, day}`
//! objects instead.

use std::path::Path;

use anyhow::{Context, Result};
use block_engine::TaskRequest;
use serde::Deserialize;

use crate::config::{same_name, Config};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TaskRecord {
    #[serde(alias = "Cliente")]
    pub client: String,
    #[serde(alias = "Tarea")]
    pub description: String,
    #[serde(alias = "Dia")]
    pub day: u32,
}

pub fn read_tasks(path: impl AsRef<Path>) -> Result<Vec<TaskRecord>> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read task file: {}", path.display()))?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        serde_json::from_str(&raw)
            .with_context(|| format!("Invalid task file: {}", path.display()))
    } else {
        parse_csv(&raw).with_context(|| format!("Invalid task file: {}", path.display()))
    }
}

/// Parse `Cliente,Tarea,Dia` rows. Extra columns are ignored.
pub fn parse_csv(raw: &str) -> Result<Vec<TaskRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(raw.as_bytes());
    let records = reader
        .deserialize()
        .collect::<std::result::Result<Vec<TaskRecord>, _>>()?;
    Ok(records)
}

/// The records of one client, in file order.
pub fn tasks_for_client(records: &[TaskRecord], client: &str) -> Vec<TaskRequest> {
    records
        .iter()
        .filter(|record| same_name(&record.client, client))
        .map(|record| TaskRequest::new(record.day, record.description.clone()))
        .collect()
}

/// Distinct client names that match no configured client.
pub fn unknown_clients<'a>(records: &'a [TaskRecord], config: &Config) -> Vec<&'a str> {
    let mut unknown: Vec<&str> = Vec::new();
    for record in records {
        let name = record.client.trim();
        if config.client(name).is_none() && !unknown.iter().any(|seen| same_name(seen, name)) {
            unknown.push(name);
        }
    }
    unknown
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(client: &str, description: &str, day: u32) -> TaskRecord {
        TaskRecord {
            client: client.to_string(),
            description: description.to_string(),
            day,
        }
    }

    #[test]
    fn filters_by_client_case_insensitively() {
        let records = vec![
            record("Globex", "a", 4),
            record("initech", "b", 4),
            record(" GLOBEX ", "c", 5),
        ];
        let tasks = tasks_for_client(&records, "globex");
        assert_eq!(tasks, vec![TaskRequest::new(4, "a"), TaskRequest::new(5, "c")]);
    }

    #[test]
    fn parses_json_records() {
        let records: Vec<TaskRecord> =
            serde_json::from_str(r#"[{"client": "Globex", "description": "Fix bug", "day": 12}]"#)
                .unwrap();
        assert_eq!(records, vec![record("Globex", "Fix bug", 12)]);
    }

    #[test]
    fn parses_csv_rows_with_extra_columns() {
        let raw = "Cliente,Tarea,Dia,Origen\nGlobex,\"Fix bug, again\", 12 ,asana\nInitech,Deploy,3,csv\n";
        let records = parse_csv(raw).unwrap();
        assert_eq!(
            records,
            vec![record("Globex", "Fix bug, again", 12), record("Initech", "Deploy", 3)]
        );
    }

    #[test]
    fn csv_without_day_column_is_rejected() {
        let err = parse_csv("Cliente,Tarea\nGlobex,Fix bug\n").unwrap_err();
        assert!(format!("{err:#}").contains("day"), "got: {err:#}");
    }
}
