use clap::Args;
use serde_json::json;
use uuid::Uuid;

use crate::auth::SessionVerifier;
use crate::cli::OutputFormat;
use crate::config::config;
use crate::is_production;

#[derive(Args)]
pub struct TokenArgs {
    #[arg(help = "Account id the token is issued for")]
    pub account_id: Uuid,

    #[arg(long, help = "Email claim to embed")]
    pub email: Option<String>,
}

/// Tokens normally come from the identity provider. This mints one with the
/// configured secret for local development only.
pub fn handle(args: TokenArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    if is_production!() {
        anyhow::bail!("refusing to mint session tokens in production");
    }

    let verifier = SessionVerifier::new(&config().security);
    let token = verifier.issue(args.account_id, args.email)?;

    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({ "token": token }))?);
        }
        OutputFormat::Text => println!("{}", token),
    }
    Ok(())
}
