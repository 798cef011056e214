//! # Inspect Subcommand
//!
//! Offline decomposition of a filing-number string against the wire
//! contract (`^\d{5}-(0|CUR)-\d{2}-\d{4}$`). No service connection —
//! useful for auditors triaging numbers out of spreadsheets and scanned
//! resolutions.

use anyhow::Result;
use clap::Args;
use radicar_core::{FilingNumber, NumberingType};

/// Arguments for the `radicar inspect` subcommand.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// The filing-number string to decompose.
    #[arg(value_name = "NUMBER")]
    pub number: String,

    /// Emit the decomposition as JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

/// Execute the inspect subcommand.
///
/// Returns exit code: 0 when the number is well-formed, 1 otherwise.
pub fn run_inspect(args: &InspectArgs) -> Result<u8> {
    let parsed: FilingNumber = match args.number.parse() {
        Ok(parsed) => parsed,
        Err(err) => {
            if args.json {
                println!(
                    "{}",
                    serde_json::json!({ "well_formed": false, "error": err.to_string() })
                );
            } else {
                eprintln!("malformed: {err}");
            }
            return Ok(1);
        }
    };

    let regime = match parsed.numbering_type() {
        NumberingType::Secretaria => "secretaría",
        NumberingType::Curaduria => "curaduría urbana",
    };

    if args.json {
        println!(
            "{}",
            serde_json::json!({
                "well_formed": true,
                "dane_code": parsed.dane_code().as_str(),
                "numbering_type": parsed.numbering_type(),
                "year": parsed.year().value(),
                "sequence": parsed.sequence(),
            })
        );
    } else {
        println!("number:     {parsed}");
        println!("dane code:  {}", parsed.dane_code());
        println!("regime:     {regime} ({})", parsed.numbering_type().code());
        println!("year:       {}", parsed.year());
        println!("sequence:   {}", parsed.sequence());
    }
    Ok(0)
}
