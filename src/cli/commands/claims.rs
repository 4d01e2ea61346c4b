use clap::Subcommand;
use serde_json::Value;
use uuid::Uuid;

use crate::cli::client::ApiClient;
use crate::cli::utils::{output_empty_collection, output_success, short_id};
use crate::cli::OutputFormat;
use crate::database::models::ClaimStatus;

#[derive(Subcommand)]
pub enum ClaimsCommands {
    #[command(about = "List claims, optionally filtered by status")]
    List {
        #[arg(long, help = "pending, approved or rejected")]
        status: Option<ClaimStatus>,
    },

    #[command(about = "Approve a pending claim")]
    Approve {
        #[arg(help = "Claim id")]
        id: Uuid,
    },

    #[command(about = "Reject a pending claim")]
    Reject {
        #[arg(help = "Claim id")]
        id: Uuid,
    },
}

pub async fn handle(cmd: ClaimsCommands, client: &ApiClient, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        ClaimsCommands::List { status } => {
            let path = match status {
                Some(status) => format!("/api/admin/claims?status={}", status),
                None => "/api/admin/claims".to_string(),
            };
            let claims = client.get(&path).await?;
            let rows = claims.as_array().cloned().unwrap_or_default();

            if rows.is_empty() {
                return output_empty_collection(&output_format, "claims", "No claims found");
            }

            match output_format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
                OutputFormat::Text => {
                    println!("{:<10} {:<10} {:<10} {:<10} {}", "CLAIM", "PROFILE", "BUSINESS", "STATUS", "SUBMITTED");
                    println!("{}", "-".repeat(70));
                    for claim in &rows {
                        let field = |name: &str| claim.get(name).and_then(Value::as_str).unwrap_or("-").to_string();
                        println!(
                            "{:<10} {:<10} {:<10} {:<10} {}",
                            short_id(&field("id")),
                            short_id(&field("profile_id")),
                            short_id(&field("business_id")),
                            field("status"),
                            field("submitted_at")
                        );
                    }
                }
            }
            Ok(())
        }
        ClaimsCommands::Approve { id } => {
            let claim = client.post(&format!("/api/admin/claims/{}/approve", id)).await?;
            output_success(&output_format, &format!("Claim {} approved", id), Some(claim))
        }
        ClaimsCommands::Reject { id } => {
            let claim = client.post(&format!("/api/admin/claims/{}/reject", id)).await?;
            output_success(&output_format, &format!("Claim {} rejected", id), Some(claim))
        }
    }
}
