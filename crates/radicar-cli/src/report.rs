//! # Report Subcommand
//!
//! Fetches the sequence-audit report for an entity and year: filing
//! counts, every gap and duplicate, and the validity percentage. The
//! output of this command is what gets attached to audit responses.

use anyhow::Result;
use clap::Args;
use uuid::Uuid;

use crate::client::{ApiClient, ConnectionArgs};

/// Arguments for the `radicar report` subcommand.
#[derive(Args, Debug)]
pub struct ReportArgs {
    /// The entity to audit.
    #[arg(long)]
    pub entity_id: Uuid,

    /// Full 4-digit year to audit. Defaults to the current year.
    #[arg(long)]
    pub year: Option<u16>,

    /// Emit the raw report as JSON.
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub connection: ConnectionArgs,
}

/// Execute the report subcommand.
///
/// Returns exit code: 0 when the year is clean, 1 when problems were
/// found.
pub fn run_report(args: &ReportArgs) -> Result<u8> {
    let client = ApiClient::new(&args.connection)?;

    let mut path = format!("/v1/entities/{}/sequence-report", args.entity_id);
    if let Some(year) = args.year {
        path.push_str(&format!("?year={year}"));
    }
    let report = client.get_json(&path)?;

    if args.json {
        println!("{report}");
    } else {
        println!("entity:    {}", args.entity_id);
        println!("year:      {}", report["year"]);
        println!("filings:   {}", report["total_filings"]);
        println!("valid:     {}", report["valid_filings"]);
        println!("validity:  {}%", report["validity_percentage"]);

        let problems = report["problems"].as_array().cloned().unwrap_or_default();
        if problems.is_empty() {
            println!("sequence:  dense — no gaps, no duplicates");
        } else {
            println!("problems:  {}", problems.len());
            for problem in &problems {
                println!(
                    "  [{}] {}-{:04}: {}",
                    problem["kind"].as_str().unwrap_or("?"),
                    problem["numbering_type"].as_str().unwrap_or("?"),
                    problem["sequence"].as_u64().unwrap_or(0),
                    problem["description"].as_str().unwrap_or(""),
                );
            }
        }
    }

    let problem_count = report["problems"].as_array().map_or(0, |p| p.len());
    Ok(if problem_count == 0 { 0 } else { 1 })
}
