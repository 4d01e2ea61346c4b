use clap::Args;
use serde_json::json;
use uuid::Uuid;

use crate::access::{classify, classify_path, Actor, AuthenticatedActor, Decision};
use crate::cli::OutputFormat;
use crate::types::{OnboardingProgress, OnboardingStep, Role};

#[derive(Args)]
pub struct ClassifyArgs {
    #[arg(help = "Request path, optionally with a query string")]
    pub path: String,

    #[arg(long, help = "Actor role (user, business_owner, admin); omit for an anonymous visitor")]
    pub role: Option<Role>,

    #[arg(
        long,
        default_value_t = 4,
        value_parser = clap::value_parser!(u8).range(0..=4),
        help = "Number of onboarding steps the actor has completed"
    )]
    pub steps: u8,
}

pub fn handle(args: ClassifyArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let actor = match args.role {
        None => Actor::Anonymous,
        Some(role) => {
            let mut progress = OnboardingProgress::default();
            for step in OnboardingStep::ALL.iter().take(args.steps as usize) {
                progress.mark(*step);
            }
            Actor::Authenticated(AuthenticatedActor::new(Uuid::nil(), role, progress))
        }
    };

    let path_only = args.path.split('?').next().unwrap_or_default();
    let class = classify_path(path_only);
    let decision = classify(&actor, &args.path);

    match output_format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "path": args.path,
                    "class": class.map(|c| c.as_str()),
                    "actor": args.role.map(|r| r.as_str()).unwrap_or("anonymous"),
                    "decision": decision
                }))?
            );
        }
        OutputFormat::Text => {
            println!("Path:     {}", args.path);
            println!("Class:    {}", class.map(|c| c.as_str()).unwrap_or("unclassified"));
            println!("Actor:    {}", args.role.map(|r| r.as_str()).unwrap_or("anonymous"));
            match decision {
                Decision::PassThrough => println!("Decision: pass through"),
                Decision::Redirect(location) => println!("Decision: redirect -> {}", location),
            }
        }
    }
    Ok(())
}
