//! Batch route evaluation harness.
//!
//! Runs a list of `start:end` landmark pairs through the navigation
//! supervisor against the built-in backend, then writes a CSV of per-pair
//! results and a human-readable summary.

mod pairs;
mod report;
mod run;

use std::path::PathBuf;

use anyhow::Result;
use chrono::Local;
use clap::Parser;

#[derive(Parser)]
#[command(name = "eval", version, about = "Batch trip evaluation over landmark pairs")]
struct Cli {
    /// Pairs as `start:end` separated by commas, e.g. `school:home,home:market`.
    /// Uses the standing evaluation set when omitted.
    #[arg(long)]
    pairs: Option<String>,

    /// Where the per-pair CSV is written.
    #[arg(long, default_value = "evaluation/routes_results.csv")]
    out_csv: PathBuf,

    /// Where the summary text is written.
    #[arg(long, default_value = "evaluation/routes_summary.txt")]
    out_txt: PathBuf,
}

fn main() {
    navigator::logging::init();
    if let Err(err) = run_cli() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    let pair_list = match &cli.pairs {
        Some(raw) => pairs::parse_pairs(raw)?,
        None => pairs::default_pairs(),
    };

    let report_dir = cli
        .out_csv
        .parent()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let results = run::run_pairs(&pair_list, &report_dir)?;

    report::write_csv(&cli.out_csv, &results)?;
    report::write_summary(&cli.out_txt, &results, Local::now())?;
    println!(
        "saved: {} and {}",
        cli.out_csv.display(),
        cli.out_txt.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_defaults() {
        let cli = Cli::parse_from(["eval"]);
        assert!(cli.pairs.is_none());
        assert_eq!(cli.out_csv, PathBuf::from("evaluation/routes_results.csv"));
    }

    #[test]
    fn parse_explicit_pairs() {
        let cli = Cli::parse_from(["eval", "--pairs", "school:home", "--out-csv", "r.csv"]);
        assert_eq!(cli.pairs.as_deref(), Some("school:home"));
        assert_eq!(cli.out_csv, PathBuf::from("r.csv"));
    }
}
