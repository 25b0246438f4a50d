use std::time::Duration;

use anyhow::{bail, Result};
use clap::Args;
use osp_core::models::staff::StaffSubject;
use osp_service::auth::JwtAuthGate;

const SECS_PER_DAY: u64 = 24 * 60 * 60;

#[derive(Debug, Args)]
pub struct IssueTokenArgs {
    /// Staff email carried in the token
    #[arg(long)]
    pub email: String,

    /// Subject id (defaults to the email)
    #[arg(long)]
    pub subject: Option<String>,

    /// Lifetime in days
    #[arg(long, default_value_t = 7)]
    pub ttl_days: u64,
}

/// Mints a staff bearer token signed with `secret`.
pub fn execute(secret: &str, args: IssueTokenArgs) -> Result<String> {
    if args.ttl_days == 0 {
        bail!("--ttl-days must be at least 1");
    }

    let subject = StaffSubject {
        subject: args.subject.unwrap_or_else(|| args.email.clone()),
        email: Some(args.email),
    };
    let ttl = Duration::from_secs(args.ttl_days.saturating_mul(SECS_PER_DAY));

    let token = JwtAuthGate::new(secret.as_bytes()).issue(&subject, ttl)?;
    Ok(token)
}
