use serde_json::json;

use crate::access::{PathPattern, ROUTE_TABLE};
use crate::cli::OutputFormat;

pub fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let rules: Vec<_> = ROUTE_TABLE
                .iter()
                .map(|rule| {
                    json!({
                        "path": rule.pattern.as_str(),
                        "match": match_kind(&rule.pattern),
                        "class": rule.class.as_str()
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&json!({ "routes": rules }))?);
        }
        OutputFormat::Text => {
            println!("{:<20} {:<8} {}", "PATH", "MATCH", "CLASS");
            println!("{}", "-".repeat(44));
            for rule in ROUTE_TABLE {
                println!(
                    "{:<20} {:<8} {}",
                    rule.pattern.as_str(),
                    match_kind(&rule.pattern),
                    rule.class.as_str()
                );
            }
            println!();
            println!("Paths matching no rule are unclassified.");
        }
    }
    Ok(())
}

fn match_kind(pattern: &PathPattern) -> &'static str {
    match pattern {
        PathPattern::Exact(_) => "exact",
        PathPattern::Prefix(_) => "prefix",
    }
}
