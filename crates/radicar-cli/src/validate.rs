//! # Validate Subcommand
//!
//! Remote four-stage validation of a candidate number against a running
//! radicar-api service: format, components, uniqueness, and sequence
//! position, evaluated against the entity's authoritative state.

use anyhow::Result;
use clap::Args;
use uuid::Uuid;

use crate::client::{ApiClient, ConnectionArgs};

/// Arguments for the `radicar validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// The entity the candidate claims to belong to.
    #[arg(long)]
    pub entity_id: Uuid,

    /// The candidate filing-number string.
    #[arg(value_name = "NUMBER")]
    pub number: String,

    /// Emit the raw validation result as JSON.
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub connection: ConnectionArgs,
}

/// Execute the validate subcommand.
///
/// Returns exit code: 0 when the candidate is valid, 1 when rejected.
pub fn run_validate(args: &ValidateArgs) -> Result<u8> {
    let client = ApiClient::new(&args.connection)?;
    let result = client.post_json(
        "/v1/filings/validate",
        &serde_json::json!({
            "entity_id": args.entity_id,
            "number": args.number,
        }),
    )?;

    if args.json {
        println!("{result}");
    } else if result["valid"].as_bool().unwrap_or(false) {
        println!("{}: valid", args.number);
    } else {
        println!(
            "{}: rejected at {} — {}",
            args.number,
            result["stage"].as_str().unwrap_or("?"),
            result["reason"].as_str().unwrap_or("no reason given"),
        );
    }

    Ok(if result["valid"].as_bool().unwrap_or(false) {
        0
    } else {
        1
    })
}
