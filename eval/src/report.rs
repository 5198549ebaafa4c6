//! CSV and summary outputs for evaluated pairs.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};

use crate::run::PairResult;

/// Write the per-pair results as CSV.
pub fn write_csv(path: &Path, results: &[PairResult]) -> Result<()> {
    ensure_parent(path)?;
    let mut buf = String::from("start,end,straight_m,planned_m,detour_percent,outcome,steps\n");
    for result in results {
        buf.push_str(&format!(
            "{},{},{:.2},{:.2},{:.2},{},{}\n",
            result.start,
            result.end,
            result.straight_m,
            result.planned_m,
            result.detour_percent(),
            result.outcome,
            result.steps
        ));
    }
    fs::write(path, buf).with_context(|| format!("write results csv {}", path.display()))
}

/// Write the human-readable summary next to the CSV.
pub fn write_summary(
    path: &Path,
    results: &[PairResult],
    generated_at: DateTime<Local>,
) -> Result<()> {
    ensure_parent(path)?;
    let mut buf = String::new();
    buf.push_str(&format!(
        "route evaluation, {}\n\n",
        generated_at.format("%Y-%m-%d %H:%M:%S")
    ));
    for result in results {
        buf.push_str(&format!(
            "{} -> {}: {} in {} steps (planned {:.2} m, detour {:.2}%)\n",
            result.start,
            result.end,
            result.outcome,
            result.steps,
            result.planned_m,
            result.detour_percent()
        ));
    }
    if results.is_empty() {
        buf.push_str("no pairs evaluated\n");
    } else {
        let average = results
            .iter()
            .map(PairResult::detour_percent)
            .sum::<f64>()
            / results.len() as f64;
        let arrived = results
            .iter()
            .filter(|result| result.outcome == "arrived")
            .count();
        buf.push_str(&format!(
            "\naverage detour: {average:.2}%\narrived: {arrived}/{}\n",
            results.len()
        ));
    }
    fs::write(path, buf).with_context(|| format!("write summary {}", path.display()))
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create output dir {}", parent.display()))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(start: &str, end: &str, outcome: &str) -> PairResult {
        PairResult {
            start: start.to_string(),
            end: end.to_string(),
            straight_m: 100.0,
            planned_m: 110.0,
            outcome: outcome.to_string(),
            steps: 42,
        }
    }

    #[test]
    fn csv_has_a_header_and_one_row_per_pair() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("results.csv");
        write_csv(
            &path,
            &[result("school", "home", "arrived"), result("home", "market", "stuck")],
        )
        .expect("write");

        let contents = fs::read_to_string(&path).expect("read");
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "start,end,straight_m,planned_m,detour_percent,outcome,steps"
        );
        assert_eq!(lines[1], "school,home,100.00,110.00,10.00,arrived,42");
    }

    #[test]
    fn summary_reports_average_detour_and_arrival_count() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("nested/summary.txt");
        write_summary(
            &path,
            &[result("school", "home", "arrived"), result("home", "market", "stuck")],
            Local::now(),
        )
        .expect("write");

        let contents = fs::read_to_string(&path).expect("read");
        assert!(contents.contains("average detour: 10.00%"));
        assert!(contents.contains("arrived: 1/2"));
    }

    #[test]
    fn empty_results_still_produce_a_summary() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("summary.txt");
        write_summary(&path, &[], Local::now()).expect("write");
        let contents = fs::read_to_string(&path).expect("read");
        assert!(contents.contains("no pairs evaluated"));
    }
}
